//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <jwt>
//!     → middleware.rs (header parsing, requirement check)
//!     → token.rs (HS256 signature + expiry)
//!     → principal.rs (username + role, per request)
//! ```
//!
//! # Design Decisions
//! - Role is the only authorization axis
//! - Principal lives for one request and is never stored

pub mod middleware;
pub mod principal;
pub mod token;

pub use middleware::{AuthError, AuthRequirement, Authenticator};
pub use principal::{Principal, Role};
pub use token::{Claims, TokenKeys};
