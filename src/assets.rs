//! # Static Assets
//!
//! Fetches static assets (the widget font) from a local directory or over
//! HTTP, and caches the font for the lifetime of the process.
//!
//! ## Font caching
//!
//! The first request that needs the font fetches it. Success is stored once
//! and never invalidated. A failed fetch is logged and the request proceeds
//! without the font; the next request tries again.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::WallpaperError;

/// Family name the widget text asks for.
pub const FONT_FAMILY: &str = "Roboto";

/// Well-known asset path of the widget font.
pub const FONT_PATH: &str = "Roboto-Bold.ttf";

/// A font payload plus its base64 form for inlining.
#[derive(Debug, Clone)]
pub struct FontResource {
    pub family: String,
    pub data: Arc<Vec<u8>>,
    pub base64: String,
}

impl FontResource {
    pub fn new(family: &str, data: Vec<u8>) -> Self {
        let base64 = STANDARD.encode(&data);
        Self {
            family: family.to_string(),
            data: Arc::new(data),
            base64,
        }
    }
}

/// Source of static asset bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the asset at `path` (relative, e.g. `"Roboto-Bold.ttf"`).
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, WallpaperError>;
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetFetcher for DirAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, WallpaperError> {
        let full = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read(&full)
            .await
            .map_err(|e| WallpaperError::Asset(format!("Failed to read {}: {}", full.display(), e)))
    }
}

/// Assets fetched from `{base_url}/{path}`.
#[derive(Debug, Clone)]
pub struct HttpAssets {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAssets {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, WallpaperError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WallpaperError::Asset(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(WallpaperError::Asset(format!(
                "Fetching {} returned status {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WallpaperError::Asset(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Process-wide font cache in front of an [`AssetFetcher`].
pub struct FontCache {
    fetcher: Box<dyn AssetFetcher>,
    path: String,
    family: String,
    font: OnceCell<FontResource>,
}

impl FontCache {
    pub fn new(fetcher: Box<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            path: FONT_PATH.to_string(),
            family: FONT_FAMILY.to_string(),
            font: OnceCell::new(),
        }
    }

    /// The cached font, fetching it on first use. `None` when the fetch fails.
    pub async fn get(&self) -> Option<&FontResource> {
        let result = self
            .font
            .get_or_try_init(|| async {
                let data = self.fetcher.fetch(&self.path).await?;
                info!(path = %self.path, bytes = data.len(), "loaded font");
                Ok::<_, WallpaperError>(FontResource::new(&self.family, data))
            })
            .await;

        match result {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "font unavailable, falling back to default family");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        fail_first: bool,
    }

    #[async_trait]
    impl AssetFetcher for CountingFetcher {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>, WallpaperError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(WallpaperError::Asset(format!("{} missing", path)));
            }
            Ok(vec![0xAB; 8])
        }
    }

    #[tokio::test]
    async fn test_font_fetched_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FontCache::new(Box::new(CountingFetcher {
            calls: calls.clone(),
            fail_first: false,
        }));

        let first = cache.get().await.map(|f| f.base64.clone());
        let second = cache.get().await.map(|f| f.base64.clone());
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get().await.unwrap().family, FONT_FAMILY);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FontCache::new(Box::new(CountingFetcher {
            calls: calls.clone(),
            fail_first: true,
        }));

        assert!(cache.get().await.is_none());
        assert!(cache.get().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dir_assets_missing_file() {
        let assets = DirAssets::new("/nonexistent/yearwall-assets");
        let err = assets.fetch(FONT_PATH).await.unwrap_err();
        assert!(matches!(err, WallpaperError::Asset(_)));
    }

    #[tokio::test]
    async fn test_dir_assets_reads_file() {
        let dir = std::env::temp_dir().join(format!("yearwall-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("font.ttf"), b"abc").unwrap();

        let data = DirAssets::new(&dir).fetch("/font.ttf").await.unwrap();
        assert_eq!(data, b"abc");

        std::fs::remove_dir_all(&dir).ok();
    }
}
