//! Static asset store seam
//!
//! The router never reads files itself. It asks an [`AssetStore`] to resolve
//! a path and gets back either a complete stored response or a not-found
//! signal. The hosting binary decides which store backs the console: a
//! bundle directory on disk ([`crate::static_dir::DirAssetStore`]) or an
//! in-process map ([`MemoryAssetStore`]).

use crate::mime;
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::StatusCode;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A stored response: status, headers and body exactly as the store holds them
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Asset {
    /// Create a 200 asset with the given Content-Type and a matching Content-Length
    pub fn new(content_type: &str, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static(mime::OCTET_STREAM)),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// Override the stored status (builder pattern)
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add or replace a stored header (builder pattern)
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Result of a single store lookup
#[derive(Debug, Clone, PartialEq)]
pub enum AssetLookup {
    Found(Asset),
    NotFound,
}

impl AssetLookup {
    /// The asset, if the lookup produced a usable one.
    ///
    /// A `Found` with a non-2xx status is a store-rendered error page and
    /// counts as a miss.
    pub fn into_hit(self) -> Option<Asset> {
        match self {
            AssetLookup::Found(asset) if asset.status.is_success() => Some(asset),
            _ => None,
        }
    }
}

/// Failures of the store itself, as opposed to a missing asset
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("asset store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves request paths (always starting with `/`) to stored assets
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn lookup(&self, path: &str) -> Result<AssetLookup, AssetError>;
}

/// Asset store backed by an in-process map keyed by absolute path
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, Asset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset (builder pattern)
    pub fn with_asset(self, path: &str, asset: Asset) -> Self {
        self.insert(path, asset);
        self
    }

    /// Add or replace the asset stored at `path`
    pub fn insert(&self, path: &str, asset: Asset) {
        self.assets.write().insert(normalize_key(path), asset);
    }

    /// Remove the asset stored at `path`, returning it if present
    pub fn remove(&self, path: &str) -> Option<Asset> {
        self.assets.write().remove(&normalize_key(path))
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

fn normalize_key(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn lookup(&self, path: &str) -> Result<AssetLookup, AssetError> {
        Ok(match self.assets.read().get(&normalize_key(path)) {
            Some(asset) => AssetLookup::Found(asset.clone()),
            None => AssetLookup::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_new_sets_content_headers() {
        let asset = Asset::new("text/css; charset=utf-8", "body{}");
        assert_eq!(asset.status, StatusCode::OK);
        assert_eq!(
            asset.headers.get(CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert_eq!(asset.headers.get(CONTENT_LENGTH).unwrap(), "6");
        assert_eq!(asset.body, Bytes::from_static(b"body{}"));
    }

    #[test]
    fn test_invalid_content_type_falls_back() {
        let asset = Asset::new("bad\nvalue", "x");
        assert_eq!(asset.headers.get(CONTENT_TYPE).unwrap(), mime::OCTET_STREAM);
    }

    #[test]
    fn test_into_hit() {
        let ok = Asset::new("text/plain", "ok");
        assert_eq!(AssetLookup::Found(ok.clone()).into_hit(), Some(ok));

        let error_page = Asset::new("text/html", "gone").with_status(StatusCode::NOT_FOUND);
        assert_eq!(AssetLookup::Found(error_page).into_hit(), None);

        assert_eq!(AssetLookup::NotFound.into_hit(), None);
    }

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemoryAssetStore::new()
            .with_asset("/index.html", Asset::new(mime::HTML, "<html></html>"))
            .with_asset("app.js", Asset::new("text/javascript", "run()"));

        assert_eq!(store.len(), 2);

        match store.lookup("/index.html").await.unwrap() {
            AssetLookup::Found(asset) => {
                assert_eq!(asset.body, Bytes::from_static(b"<html></html>"))
            }
            AssetLookup::NotFound => panic!("index.html should be found"),
        }

        // Keys without a leading slash are stored as absolute paths
        assert!(matches!(
            store.lookup("/app.js").await.unwrap(),
            AssetLookup::Found(_)
        ));
        assert_eq!(store.lookup("/missing.js").await.unwrap(), AssetLookup::NotFound);
    }

    #[tokio::test]
    async fn test_memory_store_lookup_accepts_relative_keys() {
        let store =
            MemoryAssetStore::new().with_asset("app.js", Asset::new("text/javascript", "run()"));

        assert!(matches!(
            store.lookup("app.js").await.unwrap(),
            AssetLookup::Found(_)
        ));
        assert!(matches!(
            store.lookup("/app.js").await.unwrap(),
            AssetLookup::Found(_)
        ));
        assert!(store.remove("app.js").is_some());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_insert_and_remove() {
        let store = MemoryAssetStore::new();
        assert!(store.is_empty());

        store.insert("/settings.json", Asset::new("application/json", "{}"));
        assert!(matches!(
            store.lookup("/settings.json").await.unwrap(),
            AssetLookup::Found(_)
        ));

        assert!(store.remove("/settings.json").is_some());
        assert_eq!(
            store.lookup("/settings.json").await.unwrap(),
            AssetLookup::NotFound
        );
    }

    #[test]
    fn test_asset_error_display() {
        let err = AssetError::Io {
            path: "/app.js".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read asset /app.js: denied");

        let err = AssetError::Unavailable("bucket offline".to_string());
        assert_eq!(err.to_string(), "asset store unavailable: bucket offline");
    }
}
