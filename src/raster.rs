//! # Rasterization
//!
//! SVG to PNG via `resvg`. The font database (system fonts are slow to scan)
//! is built on first use and reused for every later render.

use resvg::{
    tiny_skia,
    usvg::{self, fontdb},
};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::WallpaperError;

/// Renders wallpaper documents to PNG.
pub struct Rasterizer {
    load_system_fonts: bool,
    base_fonts: OnceLock<Arc<fontdb::Database>>,
}

impl Rasterizer {
    pub fn new(load_system_fonts: bool) -> Self {
        Self {
            load_system_fonts,
            base_fonts: OnceLock::new(),
        }
    }

    fn base_fonts(&self) -> &Arc<fontdb::Database> {
        self.base_fonts.get_or_init(|| {
            let mut db = fontdb::Database::new();
            if self.load_system_fonts {
                db.load_system_fonts();
            }
            point_generic_families(&mut db, None);
            debug!(faces = db.len(), "font database initialized");
            Arc::new(db)
        })
    }

    /// Render `svg` into a `width` x `height` PNG.
    ///
    /// `fonts` are extra font files made available to the document on top of
    /// the base database; `default_family` is used for text without a
    /// resolvable `font-family`.
    pub fn render(
        &self,
        svg: &str,
        width: u32,
        height: u32,
        fonts: &[Arc<Vec<u8>>],
        default_family: &str,
    ) -> Result<Vec<u8>, WallpaperError> {
        let base = self.base_fonts();
        let fontdb = if fonts.is_empty() {
            base.clone()
        } else {
            let mut db = fontdb::Database::clone(base);
            for font in fonts {
                db.load_font_source(fontdb::Source::Binary(font.clone()));
            }
            point_generic_families(&mut db, Some(default_family));
            Arc::new(db)
        };

        let mut options = usvg::Options::default();
        options.font_family = default_family.to_string();
        options.fontdb = fontdb;

        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| WallpaperError::Render(format!("Invalid SVG: {}", e)))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            WallpaperError::Render(format!("Failed to create {}x{} pixmap", width, height))
        })?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| WallpaperError::Render(format!("Failed to encode PNG: {}", e)))
    }
}

/// Aim the generic `serif`/`sans-serif` families at a face that is actually
/// loaded: `preferred` when present, otherwise the first face. fontdb's own
/// defaults name fonts that may not be installed, and text resolved to a
/// missing family is dropped.
fn point_generic_families(db: &mut fontdb::Database, preferred: Option<&str>) {
    let has = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };

    let family = match preferred {
        Some(name) if has(name) => name.to_string(),
        _ => match db.faces().next().and_then(|face| face.families.first()) {
            Some((name, _)) => name.clone(),
            None => return,
        },
    };

    db.set_serif_family(family.as_str());
    db.set_sans_serif_family(family);
}
