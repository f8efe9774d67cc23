//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → dispatch.rs (route lookup, auth, handler choice)
//!     → proxy.rs (forward to HTTP backend) | handlers.rs (RPC, health)
//!     → response.rs (gateway errors as JSON)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod handlers;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{BuildError, Dispatcher};
pub use request::X_REQUEST_ID;
pub use response::GatewayError;
pub use server::HttpServer;
