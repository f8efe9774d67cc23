//! Call state machine.
//!
//! # State Transitions
//! ```text
//! Connecting ──connected──▶ AwaitingResponse ──bytes (first parseable line)──▶ Complete
//!      │                          │  ▲
//!      │                          └──┘ bytes (no complete line yet)
//!      │                          │
//!      └──error──▶ Failed ◀──error / eof / malformed terminated line
//! ```
//!
//! Transitions are pure: the I/O driver feeds events in and stops as soon as
//! a terminal state is reached.

use crate::rpc::protocol::{RpcResponse, FRAME_DELIMITER};
use crate::rpc::RpcError;

#[derive(Debug)]
pub enum CallState {
    Connecting,
    AwaitingResponse { buffer: Vec<u8> },
    Complete(RpcResponse),
    Failed(RpcError),
}

impl CallState {
    pub fn new() -> Self {
        CallState::Connecting
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Complete(_) | CallState::Failed(_))
    }

    pub fn on_connected(self) -> Self {
        match self {
            CallState::Connecting => CallState::AwaitingResponse { buffer: Vec::new() },
            other => other,
        }
    }

    /// Append a chunk and try to complete on the first parseable line.
    pub fn on_bytes(self, chunk: &[u8]) -> Self {
        let mut buffer = match self {
            CallState::Connecting => Vec::new(),
            CallState::AwaitingResponse { buffer } => buffer,
            terminal => return terminal,
        };
        buffer.extend_from_slice(chunk);

        match first_frame(&buffer) {
            Some(Ok(response)) => CallState::Complete(response),
            Some(Err(err)) => CallState::Failed(err),
            None => CallState::AwaitingResponse { buffer },
        }
    }

    /// The peer closed its side.
    pub fn on_eof(self) -> Self {
        match self {
            CallState::Connecting => CallState::Failed(RpcError::ClosedWithoutResponse),
            CallState::AwaitingResponse { buffer } if buffer.is_empty() => {
                CallState::Failed(RpcError::ClosedWithoutResponse)
            }
            CallState::AwaitingResponse { .. } => CallState::Failed(RpcError::IncompleteResponse),
            terminal => terminal,
        }
    }

    pub fn on_transport_error(self, err: std::io::Error) -> Self {
        if self.is_terminal() {
            return self;
        }
        CallState::Failed(RpcError::Transport(err))
    }
}

impl Default for CallState {
    fn default() -> Self {
        Self::new()
    }
}

/// Attempt to decode the first non-blank line of `buffer`.
///
/// - `None`: no decision yet, more bytes are needed.
/// - `Some(Ok)`: the line parsed; anything after it is ignored.
/// - `Some(Err)`: a newline-terminated line is not valid JSON, or parsed
///   JSON is not a response object.
fn first_frame(buffer: &[u8]) -> Option<Result<RpcResponse, RpcError>> {
    let mut rest = buffer;
    loop {
        let (line, terminated, remainder) = match rest.iter().position(|b| *b == FRAME_DELIMITER) {
            Some(idx) => (&rest[..idx], true, &rest[idx + 1..]),
            None => (rest, false, &rest[rest.len()..]),
        };

        if line.iter().all(u8::is_ascii_whitespace) {
            if !terminated {
                return None;
            }
            rest = remainder;
            continue;
        }

        return match serde_json::from_slice(line) {
            Ok(value) => Some(RpcResponse::from_value(value)),
            Err(_) if !terminated => None,
            Err(e) => Some(Err(RpcError::Protocol(e.to_string()))),
        };
    }
}
