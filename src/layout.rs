//! # Widget Layout
//!
//! Pure geometry for the year-progress widget. Every size is expressed in
//! reference units (a 1438x2592 canvas) and multiplied by one uniform scale
//! factor, so the widget keeps its proportions on any canvas.
//!
//! ```text
//! ┌──────────── indicator (85% of width) ────────────┐
//! │                 2026 Year Remaining               │  title band    110
//! │              77 days left   78.9%                 │  counter band  130
//! │  ████████████████████░░░░░░░                      │  progress band  30
//! │  ▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪▪ ...       │  grid band (7 rows)
//! │                                                   │  bottom padding 40
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! Tiles run column-major: day `i` sits in column `i / 7`, row `i % 7`.

use serde::Serialize;

use crate::{calendar::CalendarFacts, error::WallpaperError, sniff};

/// Reference canvas the widget is designed against.
pub const REFERENCE_WIDTH: f64 = 1438.0;
pub const REFERENCE_HEIGHT: f64 = 2592.0;

/// Largest accepted canvas side, in pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// Rows in the day grid (one per weekday).
pub const GRID_ROWS: u32 = 7;

/// Longest year the grid has to hold.
pub const MAX_YEAR_DAYS: u32 = 366;

/// Columns the tile size is budgeted for.
pub const GRID_COLUMNS: u32 = MAX_YEAR_DAYS.div_ceil(GRID_ROWS);

const INDICATOR_WIDTH_RATIO: f64 = 0.85;
const INDICATOR_Y_RATIO: f64 = 0.65;

const BOX_PADDING: f64 = 48.0;
const BOX_RADIUS: f64 = 32.0;
const BOX_STROKE: f64 = 1.5;
const BOTTOM_MARGIN: f64 = 40.0;
const BOTTOM_PADDING: f64 = 40.0;

const TITLE_BAND: f64 = 110.0;
const COUNTER_BAND: f64 = 130.0;
const PROGRESS_BAND: f64 = 30.0;
const BAND_SPACING: f64 = 10.0;

const TITLE_BASELINE: f64 = 70.0;
const COUNTER_BASELINE: f64 = 180.0;
const TITLE_FONT_SIZE: f64 = 48.0;
const NUMERAL_FONT_SIZE: f64 = 120.0;
const LABEL_FONT_SIZE: f64 = 36.0;
const LABEL_DX: f64 = 10.0;
const LABEL_DY: f64 = -25.0;
const PERCENT_DX: f64 = 30.0;

const PROGRESS_HEIGHT: f64 = 16.0;
const TILE_GAP: f64 = 8.0;
const TILE_RADIUS: f64 = 2.0;

/// Validated output canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Canvas {
    width: u32,
    height: u32,
}

impl Canvas {
    /// Canvas used when no background dimensions are known.
    pub const DEFAULT: Canvas = Canvas {
        width: sniff::FALLBACK_WIDTH,
        height: sniff::FALLBACK_HEIGHT,
    };

    /// Accepts sides in `1..=MAX_DIMENSION`.
    pub fn new(width: u32, height: u32) -> Result<Self, WallpaperError> {
        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(WallpaperError::InvalidCanvas(format!(
                "{}x{} (each side must be 1..={})",
                width, height, MAX_DIMENSION
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Axis-aligned rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

/// Whether a day tile is already behind us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileState {
    Passed,
    Remaining,
}

/// One day in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub state: TileState,
}

/// A centered text baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Counter line: big numeral, then "days left", then the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterAnchor {
    pub x: f64,
    pub y: f64,
    pub numeral_size: f64,
    pub label_size: f64,
    pub label_dx: f64,
    pub label_dy: f64,
    pub percent_size: f64,
    pub percent_dx: f64,
}

/// Progress bar track and fill. Both share x, y, height and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressBar {
    pub track: RoundedRect,
    pub fill: RoundedRect,
}

/// Fully positioned widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub canvas: Canvas,
    pub scale: f64,
    pub indicator: RoundedRect,
    pub stroke_width: f64,
    pub bottom_margin: f64,
    pub title: TextAnchor,
    pub counter: CounterAnchor,
    pub progress: ProgressBar,
    pub tile_size: f64,
    pub tile_gap: f64,
    pub tile_radius: f64,
    pub tiles: Vec<Tile>,
}

impl Layout {
    /// Lay out the widget for `canvas` on the day described by `facts`.
    pub fn compute(canvas: Canvas, facts: &CalendarFacts) -> Self {
        let width = canvas.width as f64;
        let height = canvas.height as f64;

        // The smaller ratio keeps the widget inside both dimensions.
        let scale = (width / REFERENCE_WIDTH).min(height / REFERENCE_HEIGHT);

        let indicator_width = width * INDICATOR_WIDTH_RATIO;
        let box_padding = BOX_PADDING * scale;
        let grid_width = indicator_width - 2.0 * box_padding;

        let tile_gap = TILE_GAP * scale;
        let columns = GRID_COLUMNS as f64;
        let tile_size = (grid_width - (columns - 1.0) * tile_gap) / columns;
        let tile_pitch = tile_size + tile_gap;

        let title_band = TITLE_BAND * scale;
        let counter_band = COUNTER_BAND * scale;
        let progress_band = PROGRESS_BAND * scale;
        let grid_band = GRID_ROWS as f64 * tile_pitch + BAND_SPACING * scale;
        let indicator_height =
            title_band + counter_band + progress_band + grid_band + BOTTOM_PADDING * scale;

        let indicator_x = (width - indicator_width) / 2.0;
        let center_x = width / 2.0;

        let bottom_margin = BOTTOM_MARGIN * scale;
        let mut indicator_y = height * INDICATOR_Y_RATIO;
        if indicator_y + indicator_height > height - bottom_margin {
            indicator_y = height - bottom_margin - indicator_height;
        }

        let grid_x = center_x - grid_width / 2.0;
        let grid_y =
            indicator_y + title_band + counter_band + progress_band + BAND_SPACING * scale;

        let tiles = (0..facts.total_days)
            .map(|i| {
                let column = (i / GRID_ROWS) as f64;
                let row = (i % GRID_ROWS) as f64;
                Tile {
                    x: grid_x + column * tile_pitch,
                    y: grid_y + row * tile_pitch,
                    size: tile_size,
                    state: if i < facts.day_of_year {
                        TileState::Passed
                    } else {
                        TileState::Remaining
                    },
                }
            })
            .collect();

        let progress_height = PROGRESS_HEIGHT * scale;
        let progress_y = indicator_y + title_band + counter_band + BAND_SPACING * scale;
        let track = RoundedRect {
            x: grid_x,
            y: progress_y,
            width: grid_width,
            height: progress_height,
            radius: progress_height / 2.0,
        };
        let fill = RoundedRect {
            width: grid_width * facts.progress,
            ..track
        };

        Self {
            canvas,
            scale,
            indicator: RoundedRect {
                x: indicator_x,
                y: indicator_y,
                width: indicator_width,
                height: indicator_height,
                radius: BOX_RADIUS * scale,
            },
            stroke_width: BOX_STROKE * scale,
            bottom_margin,
            title: TextAnchor {
                x: center_x,
                y: indicator_y + TITLE_BASELINE * scale,
                font_size: TITLE_FONT_SIZE * scale,
            },
            counter: CounterAnchor {
                x: center_x,
                y: indicator_y + COUNTER_BASELINE * scale,
                numeral_size: NUMERAL_FONT_SIZE * scale,
                label_size: LABEL_FONT_SIZE * scale,
                label_dx: LABEL_DX * scale,
                label_dy: LABEL_DY * scale,
                percent_size: TITLE_FONT_SIZE * scale,
                percent_dx: PERCENT_DX * scale,
            },
            progress: ProgressBar { track, fill },
            tile_size,
            tile_gap,
            tile_radius: TILE_RADIUS * scale,
            tiles,
        }
    }

    /// Tiles already elapsed (including today).
    pub fn passed_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.state == TileState::Passed)
            .count()
    }
}
