//! # Pipeline Tests
//!
//! End-to-end checks of sniff → calendar → layout → scene → rasterize using
//! real PNG and JPEG files encoded on the fly.

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat as Encoding, RgbImage};
use pretty_assertions::assert_eq;
use std::io::Cursor;

use yearwall::{
    assets::{FONT_FAMILY, FontResource},
    calendar::CalendarFacts,
    layout::{Canvas, Layout, TileState},
    raster::Rasterizer,
    scene::{BackgroundImage, Scene},
    sniff::{self, ImageFormat, ImageInfo},
};

fn encode(width: u32, height: u32, encoding: Encoding) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, encoding).unwrap();
    out.into_inner()
}

fn date(y: i32, m: u32, d: u32) -> CalendarFacts {
    CalendarFacts::for_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

#[test]
fn sniffs_real_png() {
    let png = encode(800, 600, Encoding::Png);
    assert_eq!(
        sniff::sniff(&png),
        ImageInfo {
            format: Some(ImageFormat::Png),
            width: 800,
            height: 600,
        }
    );
}

#[test]
fn sniffs_real_jpeg() {
    let jpeg = encode(321, 123, Encoding::Jpeg);
    assert_eq!(
        sniff::sniff(&jpeg),
        ImageInfo {
            format: Some(ImageFormat::Jpeg),
            width: 321,
            height: 123,
        }
    );
}

#[test]
fn sniffs_garbage_as_default_canvas() {
    let info = sniff::sniff(b"0123456789");
    assert_eq!((info.width, info.height), (1438, 2592));
    assert_eq!(
        Canvas::new(info.width, info.height).unwrap(),
        Canvas::DEFAULT
    );
}

#[test]
fn svg_parses_with_and_without_font() {
    let png = encode(90, 160, Encoding::Png);
    let info = sniff::sniff(&png);
    let facts = date(2026, 10, 15);
    let layout = Layout::compute(Canvas::new(info.width, info.height).unwrap(), &facts);
    let background = BackgroundImage::from_bytes(ImageFormat::Png, &png);
    let font = FontResource::new(FONT_FAMILY, vec![0u8; 32]);

    let options = resvg::usvg::Options::default();
    for font in [None, Some(&font)] {
        let svg = Scene::new(&layout, &facts, &background, font).to_svg();
        let tree = resvg::usvg::Tree::from_str(&svg, &options).unwrap();
        assert_eq!(tree.size().width(), 90.0);
        assert_eq!(tree.size().height(), 160.0);
    }
}

#[test]
fn renders_png_matching_upload_size() {
    let jpeg = encode(120, 216, Encoding::Jpeg);
    let info = sniff::sniff(&jpeg);
    let canvas = Canvas::new(info.width, info.height).unwrap();
    let facts = date(2024, 12, 31);
    let layout = Layout::compute(canvas, &facts);
    let background = BackgroundImage::from_bytes(ImageFormat::Jpeg, &jpeg);
    let svg = Scene::new(&layout, &facts, &background, None).to_svg();

    let png = Rasterizer::new(false)
        .render(&svg, canvas.width(), canvas.height(), &[], FONT_FAMILY)
        .unwrap();

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 216));
}

#[test]
fn widget_text_is_drawn_without_embedded_font() {
    let mut system = resvg::usvg::fontdb::Database::new();
    system.load_system_fonts();
    if system.is_empty() {
        return; // nothing to draw text with on this host
    }

    let png = encode(360, 648, Encoding::Png);
    let canvas = Canvas::new(360, 648).unwrap();
    let facts = date(2026, 10, 15);
    let layout = Layout::compute(canvas, &facts);
    let background = BackgroundImage::from_bytes(ImageFormat::Png, &png);
    let svg = Scene::new(&layout, &facts, &background, None).to_svg();

    let textless: String = svg
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !(line.starts_with("<text") || line.starts_with("<tspan") || line.starts_with("</text"))
        })
        .map(|line| format!("{}\n", line))
        .collect();
    assert!(!textless.contains("Year Remaining"));

    let rasterizer = Rasterizer::new(true);
    let with_text = rasterizer.render(&svg, 360, 648, &[], FONT_FAMILY).unwrap();
    let without_text = rasterizer
        .render(&textless, 360, 648, &[], FONT_FAMILY)
        .unwrap();
    assert_ne!(with_text, without_text);
}

#[test]
fn last_day_of_leap_year_has_every_tile_passed() {
    let facts = date(2024, 12, 31);
    assert_eq!(facts.remaining_days, 0);
    assert_eq!(facts.progress, 1.0);

    let layout = Layout::compute(Canvas::DEFAULT, &facts);
    assert_eq!(layout.tiles.len(), 366);
    assert!(layout.tiles.iter().all(|t| t.state == TileState::Passed));
    assert_eq!(layout.progress.fill.width, layout.progress.track.width);
}

#[test]
fn first_day_has_one_tile_passed() {
    let facts = date(2025, 1, 1);
    let layout = Layout::compute(Canvas::new(1080, 1920).unwrap(), &facts);
    assert_eq!(layout.tiles.len(), 365);
    assert_eq!(layout.passed_count(), 1);
    assert_eq!(layout.tiles[0].state, TileState::Passed);
    assert_eq!(layout.tiles[1].state, TileState::Remaining);
}

#[test]
fn layout_serializes_to_json() {
    let layout = Layout::compute(Canvas::DEFAULT, &date(2026, 3, 3));
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["canvas"]["width"], 1438);
    assert_eq!(json["tiles"].as_array().unwrap().len(), 365);
    assert_eq!(json["tiles"][0]["state"], "passed");
    assert_eq!(json["tiles"][364]["state"], "remaining");
}
