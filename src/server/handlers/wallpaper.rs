//! Wallpaper generation handlers.

use axum::{
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    assets::FONT_FAMILY,
    calendar::CalendarFacts,
    layout::{Canvas, Layout, MAX_DIMENSION},
    scene::{BackgroundImage, Scene},
    sniff::{self, ImageFormat},
};

use super::super::state::AppState;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field carrying the background photo.
const IMAGE_FIELD: &str = "image";

/// Query parameters for the generate endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    /// `svg` returns the vector document instead of a PNG
    pub format: Option<String>,
}

impl RenderQuery {
    fn wants_svg(&self) -> bool {
        self.format.as_deref() == Some("svg")
    }
}

/// GET - nothing to draw on, send the visitor to the project page.
pub async fn redirect(State(state): State<Arc<AppState>>) -> Response {
    found(&state.config.redirect_url)
}

/// POST - render the widget over the uploaded `image` field.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    if declared_length(&headers).is_some_and(|len| len > MAX_UPLOAD_BYTES) {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request entity too large (max 5MB)",
        )
            .into_response();
    }

    let upload = match multipart {
        Ok(multipart) => match read_image_field(multipart).await {
            Ok(upload) => upload,
            Err(response) => return response,
        },
        Err(e) => {
            warn!(error = %e, "could not parse form data");
            None
        }
    };

    let Some(bytes) = upload else {
        return found(&state.config.redirect_url);
    };

    let Some(format) = ImageFormat::detect(&bytes) else {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported image format. Only PNG and JPEG are allowed.",
        )
            .into_response();
    };

    let info = sniff::sniff(&bytes);
    let canvas = match Canvas::new(info.width, info.height) {
        Ok(canvas) => canvas,
        Err(e) => {
            warn!(width = info.width, height = info.height, "rejecting upload");
            return (
                StatusCode::BAD_REQUEST,
                format!("Unsupported image dimensions (max {}px): {}", MAX_DIMENSION, e),
            )
                .into_response();
        }
    };

    let background = BackgroundImage::from_bytes(format, &bytes);
    drop(bytes);

    let facts = CalendarFacts::now();
    let font = state.fonts.get().await;
    let layout = Layout::compute(canvas, &facts);
    let svg = Scene::new(&layout, &facts, &background, font).to_svg();

    if query.wants_svg() {
        return ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response();
    }

    let fonts: Vec<_> = font.map(|f| f.data.clone()).into_iter().collect();
    let (width, height) = (canvas.width(), canvas.height());

    // Move CPU-intensive work to blocking thread pool
    let render_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        render_state
            .rasterizer
            .render(&svg, width, height, &fonts, FONT_FAMILY)
    })
    .await;

    match result {
        Ok(Ok(png)) => {
            info!(
                width,
                height,
                days_passed = layout.passed_count(),
                bytes = png.len(),
                "generated wallpaper"
            );
            (
                [
                    (header::CONTENT_TYPE, "image/png"),
                    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
                ],
                png,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, width, height, "rasterization failed");
            e.into_response()
        }
        Err(e) => {
            error!(error = %e, "render task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task error: {}", e),
            )
                .into_response()
        }
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn too_large() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, "File size too large (max 5MB)").into_response()
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Pull the bytes of the first file-typed `image` field.
///
/// Form errors are logged and treated as "no upload"; only an oversized
/// image is an error response.
async fn read_image_field(mut multipart: Multipart) -> Result<Option<Vec<u8>>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(too_large()),
            Err(e) => {
                warn!(error = %e, "could not parse form data");
                return Ok(None);
            }
        };

        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            continue;
        }

        // The body limit trips here when no Content-Length was declared
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(too_large()),
            Err(e) => {
                warn!(error = %e, "failed to read image field");
                return Ok(None);
            }
        };

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(too_large());
        }

        return Ok(Some(bytes.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_svg() {
        assert!(RenderQuery { format: Some("svg".into()) }.wants_svg());
        assert!(!RenderQuery { format: Some("png".into()) }.wants_svg());
        assert!(!RenderQuery::default().wants_svg());
    }

    #[test]
    fn test_declared_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);
        headers.insert(header::CONTENT_LENGTH, "1234".parse().unwrap());
        assert_eq!(declared_length(&headers), Some(1234));
        headers.insert(header::CONTENT_LENGTH, "lots".parse().unwrap());
        assert_eq!(declared_length(&headers), None);
    }

    #[test]
    fn test_found_sets_location() {
        let resp = found("https://example.com/");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "https://example.com/");
    }
}
