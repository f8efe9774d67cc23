//! Line-framed JSON RPC transport.
//!
//! # Data Flow
//! ```text
//! services.rs (typed call: CreateBlog, Checkout, ...)
//!     → client.rs (connect, write frame, read loop, deadline)
//!     → state.rs (accumulate bytes → first parseable line → Complete/Failed)
//!     → protocol.rs (frame encode/decode)
//! ```
//!
//! # Design Decisions
//! - One request per connection: no pooling, no correlation IDs
//! - No retries: calls such as Checkout have side effects

pub mod client;
pub mod protocol;
pub mod services;
pub mod state;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use client::RpcClient;
pub use protocol::{RpcRequest, RpcResponse};
pub use services::{BlogRpc, NewBlog, PurchaseRpc, RpcBackends, StakeholderRpc};
pub use state::CallState;

/// Errors that can occur during an RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection refused, reset, DNS failure.
    #[error("RPC transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Connection closed without response")]
    ClosedWithoutResponse,

    #[error("Connection closed before a complete response was received")]
    IncompleteResponse,

    #[error("Malformed RPC response: {0}")]
    Protocol(String),

    /// Failure reported by the backend itself.
    #[error("{0}")]
    Application(String),

    #[error("RPC call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to encode RPC request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RpcError {
    /// True when the backend answered with an error; false for any transport-level failure.
    pub fn is_application(&self) -> bool {
        matches!(self, RpcError::Application(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Transport(_) => "transport",
            RpcError::ClosedWithoutResponse => "closed",
            RpcError::IncompleteResponse => "incomplete",
            RpcError::Protocol(_) => "protocol",
            RpcError::Application(_) => "application",
            RpcError::Timeout(_) => "timeout",
            RpcError::Encode(_) => "encode",
        }
    }
}

/// Which RPC endpoint serves an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcBackend {
    Stakeholder,
    Blog,
    Purchase,
}

/// Operations the gateway issues over RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RpcOperation {
    GetProfile,
    GetPersonalizedBlogs,
    CreateBlog,
    Checkout,
    GetPurchasedTours,
}

impl RpcOperation {
    /// Method name on the wire.
    pub fn method(&self) -> &'static str {
        match self {
            RpcOperation::GetProfile => "GetProfile",
            RpcOperation::GetPersonalizedBlogs => "GetPersonalizedBlogs",
            RpcOperation::CreateBlog => "CreateBlog",
            RpcOperation::Checkout => "Checkout",
            RpcOperation::GetPurchasedTours => "GetPurchasedTours",
        }
    }

    pub fn backend(&self) -> RpcBackend {
        match self {
            RpcOperation::GetProfile => RpcBackend::Stakeholder,
            RpcOperation::GetPersonalizedBlogs | RpcOperation::CreateBlog => RpcBackend::Blog,
            RpcOperation::Checkout | RpcOperation::GetPurchasedTours => RpcBackend::Purchase,
        }
    }
}

impl std::fmt::Display for RpcOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method())
    }
}
