//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (one span per request, behind RequestTracer)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and response headers
//! - Metrics are cheap (atomic increments), no-ops without a recorder
//! - Spans are injectable so tests run with a no-op tracer

pub mod logging;
pub mod metrics;
pub mod tracing;
