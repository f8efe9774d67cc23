//! Booking platform API gateway.
//!
//! Front door for the booking platform's services: verifies bearer tokens,
//! blocks internal routes, and routes each request either by reverse-proxying
//! to an HTTP backend or by issuing a line-framed JSON RPC call.

// Core subsystems
pub mod auth;
pub mod config;
pub mod http;
pub mod routing;
pub mod rpc;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
