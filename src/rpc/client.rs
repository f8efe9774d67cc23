//! RPC client: one TCP connection per call.
//!
//! # Responsibilities
//! - Connect to a fixed host:port
//! - Write one request frame
//! - Drive the call state machine from socket reads
//! - Close the connection once the first response line is decoded
//!
//! The client has no deadline of its own; `with_deadline` wraps the whole
//! exchange (connect included) in one.

use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::rpc::protocol::{RpcRequest, RpcResponse};
use crate::rpc::state::CallState;
use crate::rpc::RpcError;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone)]
pub struct RpcClient {
    addr: String,
    deadline: Option<Duration>,
}

impl RpcClient {
    /// Create a client for `addr` (host:port).
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            deadline: None,
        }
    }

    /// Bound every call to `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Issue `method` with `params`, resolving to the backend's `result`.
    pub async fn call(&self, method: &str, params: Map<String, Value>) -> Result<Value, RpcError> {
        let start = Instant::now();
        let request = RpcRequest::new(method, params);

        let outcome = match self.deadline {
            Some(deadline) => with_deadline(deadline, self.exchange(&request))
                .await
                .unwrap_or(Err(RpcError::Timeout(deadline))),
            None => self.exchange(&request).await,
        }
        .and_then(RpcResponse::into_result);

        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_rpc_call(method, label, start);

        if let Err(e) = &outcome {
            tracing::debug!(addr = %self.addr, method = %method, error = %e, "RPC call failed");
        }
        outcome
    }

    async fn exchange(&self, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        let frame = request.encode()?;
        let mut state = CallState::new();

        let mut stream = TcpStream::connect(&self.addr).await?;
        state = state.on_connected();
        stream.write_all(&frame).await?;

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            state = match stream.read(&mut chunk).await {
                Ok(0) => state.on_eof(),
                Ok(n) => state.on_bytes(&chunk[..n]),
                Err(e) => state.on_transport_error(e),
            };

            match state {
                CallState::Complete(response) => {
                    let _ = stream.shutdown().await;
                    return Ok(response);
                }
                CallState::Failed(err) => return Err(err),
                pending => state = pending,
            }
        }
    }
}
