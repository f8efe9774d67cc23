//! Gateway error taxonomy and its HTTP rendering.
//!
//! # Responsibilities
//! - One error enum for everything the gateway itself answers
//! - Map each error to a status code and a JSON body
//!
//! # Design Decisions
//! - Body shape is `{"error": <status reason>, "message": <detail>}`
//! - RPC transport failures surface a generic message; the detail is logged
//! - RPC application errors surface the backend's message
//! - Upstream HTTP errors are not represented here: they are relayed verbatim

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::rpc::RpcError;

pub const NO_ROUTE_MESSAGE: &str = "No matching route found";
pub const INTERNAL_ROUTE_MESSAGE: &str = "Internal routes are not accessible externally";
pub const RPC_FAILURE_MESSAGE: &str = "Backend service unavailable";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{}", INTERNAL_ROUTE_MESSAGE)]
    InternalRoute,

    #[error("{}", NO_ROUTE_MESSAGE)]
    NoRoute,

    #[error("{0}")]
    BadRequest(String),

    #[error("Upstream request failed")]
    UpstreamUnavailable,

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Auth(e) => e.status(),
            GatewayError::InternalRoute => StatusCode::FORBIDDEN,
            GatewayError::NoRoute => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Rpc(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Rpc(e) if e.is_application() => e.to_string(),
            GatewayError::Rpc(_) => RPC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let GatewayError::Rpc(e) = &self {
            if !e.is_application() {
                tracing::error!(error = %e, kind = e.kind(), "RPC call failed");
            }
        }
        let body = json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}
