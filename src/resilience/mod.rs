//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call (proxy forward or RPC exchange):
//!     → timeouts.rs (deadline around the whole exchange, connect included)
//!     → Elapsed mapped to 504 (proxy) or RpcError::Timeout (RPC)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries: RPC calls such as Checkout are not idempotent

pub mod timeouts;
