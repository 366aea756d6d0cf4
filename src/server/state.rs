//! Server state and configuration.

use std::path::PathBuf;

use super::rate_limit::RateLimiter;
use crate::{
    assets::{AssetFetcher, DirAssets, FontCache, HttpAssets},
    raster::Rasterizer,
};

/// Where `GET /` and upload-less requests are sent.
pub const DEFAULT_REDIRECT_URL: &str = "https://github.com/kikuchy/this_year_limit_wallpaper";

/// Header carrying the client address when running behind a proxy.
pub const DEFAULT_CLIENT_IP_HEADER: &str = "cf-connecting-ip";

/// Requests per client per window.
pub const DEFAULT_RATE_LIMIT: u32 = 20;

/// Length of one rate-limit window.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// How often expired rate-limit entries are swept.
pub const RATE_LIMIT_SWEEP_SECS: u64 = 5 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8787")
    pub listen_addr: String,
    /// Directory holding static assets (font, images)
    pub assets_dir: PathBuf,
    /// Fetch assets from this base URL instead of `assets_dir`
    pub font_url: Option<String>,
    /// Redirect target when no background is supplied
    pub redirect_url: String,
    /// Request header identifying the client for rate limiting
    pub client_ip_header: String,
    /// Requests allowed per client per window
    pub rate_limit: u32,
    /// Make installed system fonts available to the rasterizer
    pub load_system_fonts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
            assets_dir: PathBuf::from("assets"),
            font_url: None,
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            client_ip_header: DEFAULT_CLIENT_IP_HEADER.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            load_system_fonts: true,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub fonts: FontCache,
    pub rasterizer: Rasterizer,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let fetcher: Box<dyn AssetFetcher> = match &config.font_url {
            Some(url) => Box::new(HttpAssets::new(url)),
            None => Box::new(DirAssets::new(&config.assets_dir)),
        };
        Self::with_fetcher(config, fetcher)
    }

    /// Build state around a custom asset source.
    pub fn with_fetcher(config: ServerConfig, fetcher: Box<dyn AssetFetcher>) -> Self {
        Self {
            fonts: FontCache::new(fetcher),
            rasterizer: Rasterizer::new(config.load_system_fonts),
            limiter: RateLimiter::new(
                config.rate_limit,
                std::time::Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
            ),
            config,
        }
    }
}
