//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, RPC outcomes, auth failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_rpc_calls_total` (counter): RPC calls by method, outcome
//! - `gateway_rpc_call_duration_seconds` (histogram): RPC latency by method
//! - `gateway_auth_failures_total` (counter): rejected tokens by reason
//! - `gateway_rejected_requests_total` (counter): filtered requests by reason
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so unit tests and
//!   deployments with metrics disabled pay nothing
//! - Route labels use rule names, never raw paths, to bound cardinality

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(metrics_address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(metrics_address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed gateway request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one RPC call; `outcome` is `ok` or an `RpcError` kind.
pub fn record_rpc_call(method: &str, outcome: &str, start: Instant) {
    counter!(
        "gateway_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("gateway_rpc_call_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_failure(reason: &'static str) {
    counter!("gateway_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("gateway_rejected_requests_total", "reason" => reason).increment(1);
}
