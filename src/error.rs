//! # Error Types
//!
//! This module defines error types used throughout the yearwall library.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for yearwall operations
#[derive(Debug, Error)]
pub enum WallpaperError {
    /// Canvas dimensions outside of 1..=4096
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    /// Input is neither PNG nor JPEG
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// SVG parsing, rasterization or PNG encoding failed
    #[error("Render error: {0}")]
    Render(String),

    /// Asset (font) could not be fetched
    #[error("Asset error: {0}")]
    Asset(String),

    /// Listener or server failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WallpaperError {
    fn into_response(self) -> Response {
        let status = match self {
            WallpaperError::InvalidCanvas(_) => StatusCode::BAD_REQUEST,
            WallpaperError::UnsupportedImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_canvas_is_bad_request() {
        let resp = WallpaperError::InvalidCanvas("0x10".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_image_status() {
        let resp = WallpaperError::UnsupportedImage("gif".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_render_failure_is_server_error() {
        let resp = WallpaperError::Render("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
