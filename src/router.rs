//! Request routing for the admin console
//!
//! Three behaviors hang off the path:
//! - the liveness path answers `{"ok":true}` without touching the store
//! - the service root redirects to the console
//! - everything under the admin prefix is served from the [`AssetStore`],
//!   falling back to the index document so client-side routes render
//!
//! Anything else is left to the default not-found response.

use crate::assets::{Asset, AssetStore};
use crate::config::RoutesConfig;
use crate::error::{json_error_response, EdgeErrorCode};
use crate::mime;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Method, Response, StatusCode};
use tracing::{debug, error, warn};

/// Where a request is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Health,
    Root,
    /// Path below the admin prefix, prefix removed (may be empty)
    Admin { remainder: &'a str },
    Unmatched,
}

/// Stateless router; build one at startup and share it by reference
#[derive(Debug, Clone)]
pub struct Router {
    routes: RoutesConfig,
    redirect_location: HeaderValue,
}

impl Router {
    pub fn new(routes: RoutesConfig) -> anyhow::Result<Self> {
        if let Err(errors) = routes.validate() {
            anyhow::bail!("Invalid routes:\n  - {}", errors.join("\n  - "));
        }
        let redirect_location = HeaderValue::from_str(&routes.redirect_target())
            .map_err(|e| anyhow::anyhow!("Invalid admin prefix '{}': {}", routes.admin_prefix, e))?;

        Ok(Self {
            routes,
            redirect_location,
        })
    }

    /// Classify a request by method and path
    pub fn classify<'a>(&self, method: &Method, path: &'a str) -> Route<'a> {
        if method != Method::GET && method != Method::HEAD {
            return Route::Unmatched;
        }

        if path == self.routes.health_path {
            return Route::Health;
        }

        if path == "/" {
            return Route::Root;
        }

        match path.strip_prefix(self.routes.admin_prefix.as_str()) {
            Some(remainder) if remainder.is_empty() || remainder.starts_with('/') => {
                Route::Admin { remainder }
            }
            _ => Route::Unmatched,
        }
    }

    /// Store path for an admin remainder; an empty remainder means the index document
    pub fn asset_path<'a>(&'a self, remainder: &'a str) -> &'a str {
        if remainder.is_empty() || remainder == "/" {
            &self.routes.index_document
        } else {
            remainder
        }
    }

    /// Produce the response for one request
    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        store: &dyn AssetStore,
    ) -> Response<Full<Bytes>> {
        match self.classify(method, path) {
            Route::Health => health_response(),
            Route::Root => self.redirect_response(),
            Route::Admin { remainder } => self.serve_admin(remainder, store).await,
            Route::Unmatched => not_found_response(),
        }
    }

    async fn serve_admin(&self, remainder: &str, store: &dyn AssetStore) -> Response<Full<Bytes>> {
        let asset_path = self.asset_path(remainder);

        match store.lookup(asset_path).await {
            Ok(lookup) => {
                if let Some(asset) = lookup.into_hit() {
                    return asset_response(asset);
                }
            }
            Err(e) => {
                warn!(path = asset_path, error = %e, "Asset lookup failed, treating as missing");
            }
        }

        let index = self.routes.index_document.as_str();
        debug!(path = asset_path, index, "Asset missing, serving index document");

        match store.lookup(index).await {
            Ok(lookup) => match lookup.into_hit() {
                Some(asset) => shell_response(asset.body),
                None => {
                    error!(index, path = asset_path, "Index document missing from asset store");
                    json_error_response(
                        EdgeErrorCode::IndexDocumentMissing,
                        format!("Index document {} not found", index),
                    )
                }
            },
            Err(e) => {
                error!(
                    index,
                    path = asset_path,
                    error = %e,
                    "Asset store failed while serving index document"
                );
                json_error_response(
                    EdgeErrorCode::AssetStoreUnavailable,
                    "Asset store unavailable",
                )
            }
        }
    }

    fn redirect_response(&self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::FOUND;
        response
            .headers_mut()
            .insert(LOCATION, self.redirect_location.clone());
        response
    }
}

fn health_response() -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "ok": true }).to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Stored asset, unchanged
fn asset_response(asset: Asset) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(asset.body));
    *response.status_mut() = asset.status;
    *response.headers_mut() = asset.headers;
    response
}

/// Index document body as a renderable HTML shell, whatever the store said about it
fn shell_response(body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(mime::HTML));
    response
}

pub fn not_found_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(b"404 Not Found")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
