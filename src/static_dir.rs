//! Asset store backed by a pre-built bundle directory on disk

use crate::assets::{Asset, AssetError, AssetLookup, AssetStore};
use crate::mime;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// File served when a lookup resolves to a directory
const DIRECTORY_INDEX: &str = "index.html";

/// Serves files below `root`; nothing outside it is ever read
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Turn a percent-encoded request path into a relative filesystem path.
///
/// Segments are checked after decoding, so `%2e%2e` is rejected like `..`.
/// Only plain segments are accepted; `..`, `.`, drive prefixes, NUL bytes and
/// names that are not valid UTF-8 once decoded yield `None`.
fn relative_path(path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(path).ok()?;
    if decoded.contains('\0') {
        return None;
    }

    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(relative.to_path_buf())
    } else {
        None
    }
}

fn io_error(path: &Path, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn lookup(&self, path: &str) -> Result<AssetLookup, AssetError> {
        let root = tokio::fs::canonicalize(&self.root).await.map_err(|e| {
            AssetError::Unavailable(format!(
                "bundle directory {} is not accessible: {}",
                self.root.display(),
                e
            ))
        })?;

        let Some(relative) = relative_path(path) else {
            warn!(path, "Rejected undecodable or non-normal asset path");
            return Ok(AssetLookup::NotFound);
        };

        let mut file_path = root.join(relative);
        match tokio::fs::metadata(&file_path).await {
            Ok(meta) if meta.is_dir() => file_path.push(DIRECTORY_INDEX),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AssetLookup::NotFound),
            Err(e) => return Err(io_error(&file_path, e)),
        }

        // Symlinks inside the bundle must not lead outside of it
        let canonical = match tokio::fs::canonicalize(&file_path).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AssetLookup::NotFound),
            Err(e) => return Err(io_error(&file_path, e)),
        };
        if !canonical.starts_with(&root) {
            warn!(
                path,
                resolved = %canonical.display(),
                "Blocked asset path escaping the bundle directory"
            );
            return Ok(AssetLookup::NotFound);
        }

        let content = match tokio::fs::read(&canonical).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AssetLookup::NotFound),
            Err(e) => return Err(io_error(&canonical, e)),
        };

        debug!(path, file = %canonical.display(), bytes = content.len(), "Asset read from bundle");
        Ok(AssetLookup::Found(Asset::new(
            mime::content_type_for(&canonical),
            content,
        )))
    }
}
