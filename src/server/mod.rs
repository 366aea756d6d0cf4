//! # HTTP Server for Wallpaper Generation
//!
//! Accepts a background photo as a multipart upload and answers with the
//! wallpaper rendered over it.
//!
//! ## Usage
//!
//! ```bash
//! yearwall serve --listen 0.0.0.0:8787 --assets ./assets
//! curl -F image=@photo.jpg http://localhost:8787/ -o wallpaper.png
//! curl -F image=@photo.jpg 'http://localhost:8787/?format=svg' -o wallpaper.svg
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `*.png`, `*.ttf`, `*.wasm` | file from the assets directory |
//! | GET | anything else | 302 to the project page |
//! | POST | any path | `image/png` (or `image/svg+xml` with `?format=svg`) |

mod handlers;
mod rate_limit;
mod state;
mod static_files;

pub use handlers::wallpaper::{MAX_UPLOAD_BYTES, RenderQuery};
pub use rate_limit::RateLimiter;
pub use state::{
    AppState, DEFAULT_CLIENT_IP_HEADER, DEFAULT_RATE_LIMIT, DEFAULT_REDIRECT_URL, ServerConfig,
};

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::WallpaperError;
use state::RATE_LIMIT_SWEEP_SECS;

/// Multipart framing on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES);

    // Every path behaves like `/` except asset files
    Router::new()
        .route(
            "/",
            get(handlers::wallpaper::redirect)
                .post(handlers::wallpaper::generate)
                .layer(upload_limit),
        )
        .route(
            "/*path",
            get(static_files::asset_handler)
                .post(handlers::wallpaper::generate)
                .layer(upload_limit),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use yearwall::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), yearwall::error::WallpaperError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8787".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), WallpaperError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    // Spawn background rate-limit cleanup task
    tokio::spawn(sweep_rate_limits(app_state.clone()));

    let app = router(app_state);

    info!(
        listen = %config.listen_addr,
        assets = %config.assets_dir.display(),
        "yearwall server starting"
    );
    if let Some(url) = &config.font_url {
        info!(font_url = %url, "fetching fonts over HTTP");
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            WallpaperError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| WallpaperError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Reject clients over their request budget with 429.
async fn rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let client = request
        .headers()
        .get(state.config.client_ip_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if state.limiter.is_limited(client.as_deref()).await {
        debug!(client = client.as_deref().unwrap_or(""), "rate limited");
        return (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
    }

    next.run(request).await
}

/// Background task to drop expired rate-limit windows.
async fn sweep_rate_limits(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(RATE_LIMIT_SWEEP_SECS));

    loop {
        interval.tick().await;
        let (removed, remaining) = state.limiter.sweep_at(Instant::now()).await;
        if removed > 0 {
            debug!(removed, remaining, "cleaned up expired rate-limit entries");
        }
    }
}
