//! # Yearwall - Year Progress Wallpapers
//!
//! Yearwall draws a "days left this year" widget on top of a photo and
//! returns the result as a PNG (or SVG) sized exactly like the photo.
//!
//! - **Sniffing**: image dimensions straight from PNG/JPEG headers
//! - **Calendar**: day of year, days remaining and progress for today
//! - **Layout**: scale-independent widget geometry with a 7-row day grid
//! - **Scene**: self-contained SVG with the photo and font inlined
//! - **Rasterization**: SVG to PNG via resvg
//!
//! ## Quick Start
//!
//! ```no_run
//! use yearwall::{
//!     calendar::CalendarFacts,
//!     layout::{Canvas, Layout},
//!     raster::Rasterizer,
//!     scene::{BackgroundImage, Scene},
//!     sniff,
//! };
//!
//! let photo = std::fs::read("photo.jpg")?;
//! let info = sniff::sniff(&photo);
//! let format = info.format.expect("PNG or JPEG");
//!
//! let canvas = Canvas::new(info.width, info.height)?;
//! let facts = CalendarFacts::now();
//! let layout = Layout::compute(canvas, &facts);
//! let background = BackgroundImage::from_bytes(format, &photo);
//! let svg = Scene::new(&layout, &facts, &background, None).to_svg();
//!
//! let png = Rasterizer::new(true).render(&svg, info.width, info.height, &[], "Roboto")?;
//! std::fs::write("wallpaper.png", png)?;
//! # Ok::<(), yearwall::error::WallpaperError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`sniff`] | PNG/JPEG header sniffing |
//! | [`calendar`] | Year progress facts |
//! | [`layout`] | Widget geometry |
//! | [`scene`] | SVG serialization |
//! | [`raster`] | SVG to PNG |
//! | [`assets`] | Font fetching and caching |
//! | [`server`] | HTTP service |
//! | [`error`] | Error types |

pub mod assets;
pub mod calendar;
pub mod error;
pub mod layout;
pub mod raster;
pub mod scene;
pub mod server;
pub mod sniff;

// Re-exports for convenience
pub use calendar::CalendarFacts;
pub use error::WallpaperError;
pub use layout::{Canvas, Layout};
