//! # Scene Serialization
//!
//! Turns a [`Layout`] into a self-contained SVG document. The background
//! photo and the optional font are embedded as `data:` URIs, so the document
//! renders without any network or filesystem access.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt::Write;

use crate::{
    assets::FontResource,
    calendar::CalendarFacts,
    layout::{Layout, RoundedRect, TileState},
    sniff::ImageFormat,
};

/// Accent colour for the remaining-day numeral, the progress fill and
/// remaining tiles.
pub const ACCENT: &str = "#00f0ff";

const BOX_FILL: &str = "rgba(0, 0, 0, 0.65)";
const BOX_STROKE: &str = "rgba(255, 255, 255, 0.2)";
const TRACK_FILL: &str = "rgba(255, 255, 255, 0.1)";
const PASSED_FILL: &str = "rgba(255, 255, 255, 0.15)";
const LABEL_FILL: &str = "rgba(255, 255, 255, 0.8)";

/// Background photo, ready to inline.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    pub format: ImageFormat,
    /// Base64 of the encoded file
    pub base64: String,
}

impl BackgroundImage {
    pub fn from_bytes(format: ImageFormat, data: &[u8]) -> Self {
        Self {
            format,
            base64: STANDARD.encode(data),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64)
    }
}

/// Everything needed to write one wallpaper document.
pub struct Scene<'a> {
    pub layout: &'a Layout,
    pub facts: &'a CalendarFacts,
    pub background: &'a BackgroundImage,
    pub font: Option<&'a FontResource>,
}

impl<'a> Scene<'a> {
    pub fn new(
        layout: &'a Layout,
        facts: &'a CalendarFacts,
        background: &'a BackgroundImage,
        font: Option<&'a FontResource>,
    ) -> Self {
        Self {
            layout,
            facts,
            background,
            font,
        }
    }

    /// Serialize to an SVG document.
    pub fn to_svg(&self) -> String {
        let layout = self.layout;
        let width = layout.canvas.width();
        let height = layout.canvas.height();
        let mut svg = String::with_capacity(
            self.background.base64.len() + self.font.map_or(0, |f| f.base64.len()) + 64 * 1024,
        );

        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = width,
            h = height
        );

        self.write_defs(&mut svg);

        let _ = writeln!(
            svg,
            r#"  <image href="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" />"#,
            self.background.data_uri(),
            width,
            height
        );

        let indicator = layout.indicator;
        let _ = writeln!(
            svg,
            r#"  <rect {} fill="{}" stroke="{}" stroke-width="{}" />"#,
            rect_attrs(&indicator),
            BOX_FILL,
            BOX_STROKE,
            layout.stroke_width
        );

        self.write_texts(&mut svg);

        let bar = layout.progress;
        let _ = writeln!(svg, r#"  <rect {} fill="{}" />"#, rect_attrs(&bar.track), TRACK_FILL);
        let _ = writeln!(svg, r#"  <rect {} fill="{}" />"#, rect_attrs(&bar.fill), ACCENT);

        for tile in &layout.tiles {
            let fill = match tile.state {
                TileState::Passed => PASSED_FILL,
                TileState::Remaining => ACCENT,
            };
            let _ = writeln!(
                svg,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" />"#,
                tile.x, tile.y, tile.size, tile.size, layout.tile_radius, fill
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn write_defs(&self, svg: &mut String) {
        let Some(font) = self.font else {
            svg.push_str(
                r#"  <defs>
    <style>
      text {
        font-family: sans-serif;
      }
    </style>
  </defs>
"#,
            );
            return;
        };

        let _ = writeln!(
            svg,
            r#"  <defs>
    <style>
      @font-face {{
        font-family: '{family}';
        src: url(data:font/ttf;base64,{data});
        font-weight: normal;
        font-style: normal;
      }}
      text {{
        font-family: '{family}', sans-serif;
      }}
    </style>
  </defs>"#,
            family = font.family,
            data = font.base64
        );
    }

    fn write_texts(&self, svg: &mut String) {
        let title = self.layout.title;
        let counter = self.layout.counter;

        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="middle" font-weight="bold" font-size="{}" fill="white">{} Year Remaining</text>"#,
            title.x, title.y, title.font_size, self.facts.year
        );

        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="middle" fill="white">"#,
            counter.x, counter.y
        );
        let _ = writeln!(
            svg,
            r#"    <tspan font-weight="900" font-size="{}" fill="{}">{}</tspan>"#,
            counter.numeral_size, ACCENT, self.facts.remaining_days
        );
        let _ = writeln!(
            svg,
            r#"    <tspan font-weight="500" font-size="{}" fill="{}" dx="{}" dy="{}">days left</tspan>"#,
            counter.label_size, LABEL_FILL, counter.label_dx, counter.label_dy
        );
        let _ = writeln!(
            svg,
            r#"    <tspan font-weight="bold" font-size="{}" fill="white" dx="{}">{}%</tspan>"#,
            counter.percent_size,
            counter.percent_dx,
            self.facts.percent_label()
        );
        svg.push_str("  </text>\n");
    }
}

fn rect_attrs(rect: &RoundedRect) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}" rx="{}""#,
        rect.x, rect.y, rect.width, rect.height, rect.radius
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Canvas;
    use chrono::NaiveDate;

    fn fixture() -> (Layout, CalendarFacts, BackgroundImage) {
        let facts = CalendarFacts::for_date(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        let layout = Layout::compute(Canvas::new(800, 600).unwrap(), &facts);
        let background = BackgroundImage::from_bytes(ImageFormat::Png, b"not really a png");
        (layout, facts, background)
    }

    #[test]
    fn test_background_data_uri() {
        let bg = BackgroundImage::from_bytes(ImageFormat::Jpeg, &[0xFF, 0xD8, 0xFF]);
        assert_eq!(bg.data_uri(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_svg_without_font() {
        let (layout, facts, bg) = fixture();
        let svg = Scene::new(&layout, &facts, &bg, None).to_svg();

        assert!(svg.starts_with(r#"<svg width="800" height="600" viewBox="0 0 800 600""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(!svg.contains("@font-face"));
        assert!(svg.contains("font-family: sans-serif;"));
        assert!(svg.contains("2026 Year Remaining"));
        assert!(svg.contains(">77</tspan>"));
        assert!(svg.contains(">days left</tspan>"));
        assert!(svg.contains(">78.9%</tspan>"));
        assert!(svg.contains(r#"preserveAspectRatio="xMidYMid slice""#));
        assert!(svg.contains(&bg.data_uri()));
    }

    #[test]
    fn test_svg_with_font() {
        let (layout, facts, bg) = fixture();
        let font = FontResource::new("Roboto", vec![0, 1, 0, 0]);
        let svg = Scene::new(&layout, &facts, &bg, Some(&font)).to_svg();

        assert!(svg.contains("font-family: 'Roboto';"));
        assert!(svg.contains("src: url(data:font/ttf;base64,AAEAAA==);"));
        assert!(svg.contains("font-family: 'Roboto', sans-serif;"));
    }

    #[test]
    fn test_one_rect_per_tile() {
        let (layout, facts, bg) = fixture();
        let svg = Scene::new(&layout, &facts, &bg, None).to_svg();

        let passed = svg.matches(&format!(r#"fill="{}" />"#, PASSED_FILL)).count();
        assert_eq!(passed, 288);
        // Remaining tiles plus the progress fill share the accent colour
        let accent = svg.matches(&format!(r#"fill="{}" />"#, ACCENT)).count();
        assert_eq!(accent, 77 + 1);
    }

    #[test]
    fn test_no_external_references() {
        let (layout, facts, bg) = fixture();
        let font = FontResource::new("Roboto", vec![1, 2, 3]);
        let svg = Scene::new(&layout, &facts, &bg, Some(&font)).to_svg();

        // Only the SVG namespace
        assert_eq!(svg.matches("http://").count(), 1);
        assert!(!svg.contains("https://"));
        for href in svg.split("href=\"").skip(1) {
            assert!(href.starts_with("data:"));
        }
    }
}
