//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every outbound call (RPC exchange, proxied backend exchange)
//! - Cancel the wrapped future when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Elapsed is returned as its own error; callers map it into their taxonomy
//!   (RPC → `RpcError::Timeout`, proxy → 504 Gateway Timeout)

use std::future::Future;
use std::time::Duration;

pub use tokio::time::error::Elapsed;

/// Run `fut` to completion or fail once `deadline` has passed.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut).await
}
