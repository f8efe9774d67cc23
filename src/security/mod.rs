//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → internal_filter.rs (reject reserved `internal` segment, before auth)
//!     → [auth + routing]
//!     → headers.rs (strip hop-by-hop + spoofed identity, assert identity)
//!     → Forward to backend
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod headers;
pub mod internal_filter;
