//! # Yearwall CLI
//!
//! Command-line interface for the year-progress wallpaper generator.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP service
//! yearwall serve --listen 0.0.0.0:8787 --assets ./assets
//!
//! # Render a wallpaper from a local photo
//! yearwall render photo.jpg --output wallpaper.png --font assets/Roboto-Bold.ttf
//!
//! # Write the SVG instead, as of a fixed date
//! yearwall render photo.png --svg --date 2026-12-31 --output wallpaper.svg
//!
//! # Dump the widget geometry as JSON
//! yearwall layout --width 1080 --height 1920
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use yearwall::{
    WallpaperError,
    assets::{FONT_FAMILY, FontResource},
    calendar::CalendarFacts,
    layout::{Canvas, Layout},
    raster::Rasterizer,
    scene::{BackgroundImage, Scene},
    server::{self, ServerConfig},
    sniff,
};

/// Yearwall - year progress wallpapers
#[derive(Parser, Debug)]
#[command(name = "yearwall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP wallpaper service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8787")]
        listen: String,

        /// Static assets directory (font, images)
        #[arg(long, default_value = "assets")]
        assets: PathBuf,

        /// Fetch the font from this base URL instead of the assets directory
        #[arg(long, value_name = "URL")]
        font_url: Option<String>,

        /// Redirect target for requests without a background image
        #[arg(long, default_value = server::DEFAULT_REDIRECT_URL)]
        redirect_url: String,

        /// Header identifying the client for rate limiting
        #[arg(long, default_value = server::DEFAULT_CLIENT_IP_HEADER)]
        client_ip_header: String,

        /// Requests per client per minute
        #[arg(long, default_value_t = server::DEFAULT_RATE_LIMIT)]
        rate_limit: u32,

        /// Do not load installed system fonts
        #[arg(long)]
        no_system_fonts: bool,
    },

    /// Render a wallpaper from a local PNG or JPEG
    Render {
        /// Background photo
        input: PathBuf,

        /// Output file
        #[arg(long, short, value_name = "FILE", default_value = "wallpaper.png")]
        output: PathBuf,

        /// Write the SVG document instead of a PNG
        #[arg(long)]
        svg: bool,

        /// Render as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Font file to embed
        #[arg(long, value_name = "TTF")]
        font: Option<PathBuf>,
    },

    /// Print the widget geometry as JSON
    Layout {
        #[arg(long, default_value_t = sniff::FALLBACK_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = sniff::FALLBACK_HEIGHT)]
        height: u32,

        /// Lay out as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), WallpaperError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            assets,
            font_url,
            redirect_url,
            client_ip_header,
            rate_limit,
            no_system_fonts,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                assets_dir: assets,
                font_url,
                redirect_url,
                client_ip_header,
                rate_limit,
                load_system_fonts: !no_system_fonts,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
        Commands::Render {
            input,
            output,
            svg,
            date,
            font,
        } => render(&input, &output, svg, date, font.as_deref()),
        Commands::Layout {
            width,
            height,
            date,
        } => {
            let canvas = Canvas::new(width, height)?;
            let layout = Layout::compute(canvas, &facts_for(date));
            let json = serde_json::to_string_pretty(&layout)
                .map_err(|e| WallpaperError::Render(format!("Failed to serialize layout: {}", e)))?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn facts_for(date: Option<NaiveDate>) -> CalendarFacts {
    date.map(CalendarFacts::for_date)
        .unwrap_or_else(CalendarFacts::now)
}

/// Run the whole pipeline on a local file.
fn render(
    input: &std::path::Path,
    output: &std::path::Path,
    as_svg: bool,
    date: Option<NaiveDate>,
    font_path: Option<&std::path::Path>,
) -> Result<(), WallpaperError> {
    let photo = std::fs::read(input)?;
    let info = sniff::sniff(&photo);
    let format = info.format.ok_or_else(|| {
        WallpaperError::UnsupportedImage(format!(
            "{} is neither PNG nor JPEG",
            input.display()
        ))
    })?;

    let canvas = Canvas::new(info.width, info.height)?;
    let facts = facts_for(date);
    let font = font_path
        .map(|p| std::fs::read(p).map(|data| FontResource::new(FONT_FAMILY, data)))
        .transpose()?;

    let layout = Layout::compute(canvas, &facts);
    let background = BackgroundImage::from_bytes(format, &photo);
    let svg = Scene::new(&layout, &facts, &background, font.as_ref()).to_svg();

    if as_svg {
        std::fs::write(output, svg)?;
    } else {
        let fonts: Vec<_> = font.iter().map(|f| f.data.clone()).collect();
        let png = Rasterizer::new(true).render(
            &svg,
            canvas.width(),
            canvas.height(),
            &fonts,
            FONT_FAMILY,
        )?;
        std::fs::write(output, png)?;
    }

    info!(
        width = canvas.width(),
        height = canvas.height(),
        days_left = facts.remaining_days,
        output = %output.display(),
        "wrote wallpaper"
    );
    Ok(())
}
