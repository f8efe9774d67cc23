//! Blocks operator-only endpoints from external traffic.
//!
//! Backends expose `/internal/...` endpoints inside their own URL space; a
//! proxied prefix would otherwise reach them. The filter runs before
//! authentication and routing so it holds regardless of route-table
//! completeness.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::GatewayError;
use crate::observability::metrics;

/// Reserved path segment.
pub const INTERNAL_SEGMENT: &str = "internal";

/// True if any segment of `path` is the reserved segment.
///
/// The whole path is percent-decoded before it is split, so an encoded
/// slash (`internal%2Fuser`) yields the segments the backends' routers see.
/// Segments compare case-insensitively.
pub fn is_internal_path(path: &str) -> bool {
    let decoded = urlencoding::decode_binary(path.as_bytes());
    String::from_utf8_lossy(&decoded)
        .split('/')
        .any(|segment| segment.eq_ignore_ascii_case(INTERNAL_SEGMENT))
}

pub async fn internal_route_filter(request: Request<Body>, next: Next) -> Response {
    if is_internal_path(request.uri().path()) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected internal route"
        );
        metrics::record_rejected("internal_route");
        return GatewayError::InternalRoute.into_response();
    }
    next.run(request).await
}
