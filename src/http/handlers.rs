//! Handlers the gateway answers itself: health and RPC-backed routes.

use axum::{
    body::{to_bytes, Body},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::http::response::GatewayError;
use crate::rpc::{NewBlog, RpcBackends, RpcOperation};

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong", "service": "API Gateway" }))
}

/// Client-supplied part of a new blog; the author is the caller.
#[derive(Debug, Deserialize)]
struct BlogDraft {
    title: String,
    description: String,
    #[serde(default)]
    images: Vec<String>,
}

async fn read_blog_draft(body: Body, limit: usize) -> Result<BlogDraft, GatewayError> {
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| GatewayError::BadRequest(format!("Failed to read request body: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid blog payload: {}", e)))
}

/// Run `operation` on behalf of `principal` and render the result as JSON.
pub async fn rpc(
    backends: &RpcBackends,
    operation: RpcOperation,
    principal: &Principal,
    body: Body,
    body_limit: usize,
) -> Result<Response, GatewayError> {
    let username = principal.username.as_str();

    let result = match operation {
        RpcOperation::GetProfile => backends.stakeholder.get_profile(username).await,
        RpcOperation::GetPersonalizedBlogs => backends.blog.personalized_blogs(username).await,
        RpcOperation::CreateBlog => {
            let draft = read_blog_draft(body, body_limit).await?;
            let blog = NewBlog {
                title: draft.title,
                description: draft.description,
                images: draft.images,
                author: principal.username.clone(),
            };
            backends.blog.create_blog(&blog).await
        }
        RpcOperation::Checkout => backends.purchase.checkout(username).await,
        RpcOperation::GetPurchasedTours => backends.purchase.purchased_tours(username).await,
    };

    match result {
        Ok(value) => Ok((StatusCode::OK, Json(value)).into_response()),
        Err(e) => {
            tracing::warn!(
                operation = %operation,
                backend = backends.addr(operation.backend()),
                username = %username,
                error = %e,
                "RPC handler failed"
            );
            Err(e.into())
        }
    }
}
