//! Error codes and JSON error responses for the edge router

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Header carrying the error code on every error response
pub const X_EDGE_ERROR: &str = "x-edge-error";

/// Error codes for failures the router reports to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeErrorCode {
    /// The SPA fallback could not find the index document
    IndexDocumentMissing,
    /// The asset store failed while serving the fallback
    AssetStoreUnavailable,
}

impl EdgeErrorCode {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            EdgeErrorCode::IndexDocumentMissing => StatusCode::INTERNAL_SERVER_ERROR,
            EdgeErrorCode::AssetStoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code as a string for the X-Edge-Error header
    pub fn as_header_value(&self) -> &'static str {
        match self {
            EdgeErrorCode::IndexDocumentMissing => "INDEX_DOCUMENT_MISSING",
            EdgeErrorCode::AssetStoreUnavailable => "ASSET_STORE_UNAVAILABLE",
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: EdgeErrorCode,
    pub message: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(code: EdgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code().as_u16(),
            code,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"code":"{}","message":"{}","status":{}}}"#,
                self.code.as_header_value(),
                self.message.replace('\"', "\\\""),
                self.status
            )
        })
    }
}

/// Create a JSON error response with the X-Edge-Error header
pub fn json_error_response(
    code: EdgeErrorCode,
    message: impl Into<String>,
) -> Response<Full<Bytes>> {
    let body = ErrorResponse::new(code, message).to_json();

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = code.status_code();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(X_EDGE_ERROR, HeaderValue::from_static(code.as_header_value()));
    response
}
