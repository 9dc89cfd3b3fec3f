//! Shellgate - an edge router for a single-page admin console
//!
//! This library provides a small HTTP front end that:
//! - Answers a liveness probe with `{"ok":true}`
//! - Serves the console and its sub-resources from a static asset store
//! - Falls back to the console's index document for client-side routes
//! - Redirects the service root to the console

pub mod assets;
pub mod config;
pub mod error;
pub mod mime;
pub mod router;
pub mod server;
pub mod static_dir;
