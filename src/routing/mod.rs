//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered lookup)
//!     → matcher.rs (method filter + path pattern)
//!     → Return: matched RouteRule or NoMatch
//!
//! Route Compilation (at startup):
//!     table.rs built-ins + RouteConfig[]
//!     → rule.rs (validate, convert)
//!     → Sort by priority (stable)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by priority, then registration)

pub mod matcher;
pub mod router;
pub mod rule;
pub mod table;

use thiserror::Error;

pub use matcher::{MethodFilter, PathPattern};
pub use router::{RouteConflict, RouteTable};
pub use rule::{Handler, PathRewrite, ProxyTarget, RouteRule};

/// Errors turning configuration into rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route '{route}': invalid method {method:?}")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}': path {path:?} must start with '/'")]
    InvalidPath { route: String, path: String },

    #[error("route '{route}': RPC handlers need an authenticated caller")]
    AnonymousRpc { route: String },
}
