//! Static asset serving (font, images) from the assets directory.

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::{handlers::wallpaper::redirect, state::AppState};

/// Extensions served from the assets directory.
const ASSET_EXTENSIONS: &[&str] = &[".png", ".ttf", ".wasm"];

pub fn is_asset_path(path: &str) -> bool {
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Serve asset files; any other path redirects like `GET /`.
pub async fn asset_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if !is_asset_path(request.uri().path()) {
        return redirect(State(state)).await;
    }

    match ServeDir::new(&state.config.assets_dir).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths() {
        assert!(is_asset_path("/Roboto-Bold.ttf"));
        assert!(is_asset_path("/img/sample.png"));
        assert!(is_asset_path("/svg2png_wasm_bg.wasm"));
        assert!(!is_asset_path("/"));
        assert!(!is_asset_path("/wallpaper.jpg"));
        assert!(!is_asset_path("/font.ttf/"));
    }
}
