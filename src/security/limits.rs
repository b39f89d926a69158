//! Request size limits.
//!
//! Bodies over `max_body_size` are refused before they reach a handler,
//! whether the size is announced by `content-length` or only discovered
//! while streaming.

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::SecurityConfig;

/// Cap request bodies at `config.max_body_size` bytes.
pub fn apply(router: Router, config: &SecurityConfig) -> Router {
    router
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
}
