//! Per-request spans behind an injectable interface.
//!
//! # Responsibilities
//! - Define the `RequestTracer` / `RequestSpan` seam the gateway calls
//! - Bracket each request in one span with HTTP and user attributes
//!
//! # Design Decisions
//! - The core only talks to the traits; exporters live behind them
//! - `NoopTracer` for tests and for `spans_enabled = false`
//! - `LogTracer` emits one structured log record per finished span
//! - Any 4xx or 5xx status ends the span with `SpanStatus::Error`
//! - The authenticated user is read from response extensions because the
//!   principal only exists once the dispatcher ran

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::Principal;

/// Value of a span attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Final state of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error,
}

/// Starts one span per request.
pub trait RequestTracer: Send + Sync {
    fn start_span(&self, name: &str) -> Box<dyn RequestSpan>;
}

/// An open span.
pub trait RequestSpan: Send {
    fn set_attribute(&mut self, key: &'static str, value: AttributeValue);
    fn add_event(&mut self, name: &str);
    fn end(self: Box<Self>, status: SpanStatus);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

struct NoopSpan;

impl RequestTracer for NoopTracer {
    fn start_span(&self, _name: &str) -> Box<dyn RequestSpan> {
        Box::new(NoopSpan)
    }
}

impl RequestSpan for NoopSpan {
    fn set_attribute(&mut self, _key: &'static str, _value: AttributeValue) {}
    fn add_event(&mut self, _name: &str) {}
    fn end(self: Box<Self>, _status: SpanStatus) {}
}

/// Writes each finished span as one `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

struct LogSpan {
    name: String,
    started: Instant,
    attributes: BTreeMap<&'static str, AttributeValue>,
    events: Vec<String>,
}

impl RequestTracer for LogTracer {
    fn start_span(&self, name: &str) -> Box<dyn RequestSpan> {
        Box::new(LogSpan {
            name: name.to_string(),
            started: Instant::now(),
            attributes: BTreeMap::new(),
            events: Vec::new(),
        })
    }
}

impl RequestSpan for LogSpan {
    fn set_attribute(&mut self, key: &'static str, value: AttributeValue) {
        self.attributes.insert(key, value);
    }

    fn add_event(&mut self, name: &str) {
        self.events.push(name.to_string());
    }

    fn end(self: Box<Self>, status: SpanStatus) {
        let attributes = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(
            target: "booking_gateway::span",
            span = %self.name,
            status = ?status,
            duration_ms = self.started.elapsed().as_millis() as u64,
            attributes = %attributes,
            events = ?self.events,
            "span finished"
        );
    }
}

/// Wrap the rest of the stack in one span.
pub async fn span_middleware(
    State(tracer): State<Arc<dyn RequestTracer>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut span = tracer.start_span("gateway.request");
    span.set_attribute("http.method", request.method().as_str().into());
    span.set_attribute("http.url", request.uri().to_string().into());
    if let Some(agent) = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    {
        span.set_attribute("http.user_agent", agent.into());
    }
    span.add_event("HTTP request received");

    let response = next.run(request).await;

    if let Some(principal) = response.extensions().get::<Principal>() {
        span.set_attribute("user.name", principal.username.clone().into());
        span.set_attribute("user.role", principal.role.as_str().into());
    }
    let status = response.status();
    span.set_attribute("http.status_code", i64::from(status.as_u16()).into());
    span.end(if status.is_client_error() || status.is_server_error() {
        SpanStatus::Error
    } else {
        SpanStatus::Ok
    });

    response
}
