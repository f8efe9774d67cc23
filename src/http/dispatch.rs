//! Request dispatch: route lookup, authentication, handler execution.
//!
//! # Data Flow
//! ```text
//! Request (already past the internal filter and the span)
//!     → RouteTable::resolve (404 when nothing matches)
//!     → Authenticator::authorize (rule's requirement; 401/403 short-circuit)
//!     → Handler: Proxy → Forwarder | Rpc → handlers::rpc | Health → ping
//!     → Principal copied into response extensions for the span
//! ```

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::auth::{AuthError, Authenticator, Principal, TokenKeys};
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::proxy::{Forwarder, UpstreamUrlError};
use crate::http::request::request_id;
use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::routing::{Handler, RouteError, RouteRule, RouteTable};
use crate::rpc::RpcBackends;

/// Errors assembling the dispatcher from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Upstream(#[from] UpstreamUrlError),
}

/// Shared, immutable request-handling state.
pub struct Dispatcher {
    routes: RouteTable,
    authenticator: Authenticator,
    forwarder: Forwarder,
    rpc: RpcBackends,
    body_limit: usize,
}

impl Dispatcher {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, BuildError> {
        let keys = TokenKeys::new(config.auth.jwt_secret.as_bytes(), config.auth.leeway_secs);
        Ok(Self {
            routes: RouteTable::from_config(&config.routes)?,
            authenticator: Authenticator::new(keys),
            forwarder: Forwarder::new(
                &config.services,
                Duration::from_secs(config.timeouts.upstream_secs),
            )?,
            rpc: RpcBackends::from_config(&config.rpc),
            body_limit: config.security.max_body_size,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn handle(&self, mut request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(request.headers()).unwrap_or("unknown").to_string();

        let Some(rule) = self.routes.resolve(&method, &path) else {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), 404, "none", start);
            return GatewayError::NoRoute.into_response();
        };

        let principal = match self.authenticator.authorize(rule.auth, request.headers()) {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    route = %rule.name,
                    reason = e.reason(),
                    "Authentication failed"
                );
                metrics::record_auth_failure(e.reason());
                let response = GatewayError::from(e).into_response();
                metrics::record_request(method.as_str(), response.status().as_u16(), &rule.name, start);
                return response;
            }
        };

        if let Some(principal) = &principal {
            request.extensions_mut().insert(principal.clone());
        }

        tracing::debug!(
            request_id = %request_id,
            route = %rule.name,
            handler = rule.handler.kind(),
            user = principal.as_ref().map(|p| p.username.as_str()).unwrap_or("-"),
            "Dispatching request"
        );

        let mut response = self
            .run(rule, principal.as_ref(), request)
            .await
            .unwrap_or_else(|e| e.into_response());

        metrics::record_request(method.as_str(), response.status().as_u16(), &rule.name, start);
        if let Some(principal) = principal {
            response.extensions_mut().insert(principal);
        }
        response
    }

    async fn run(
        &self,
        rule: &RouteRule,
        principal: Option<&Principal>,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        match &rule.handler {
            Handler::Health => Ok(handlers::ping().await.into_response()),
            Handler::Proxy(target) => self.forwarder.forward(target, principal, request).await,
            Handler::Rpc(operation) => {
                let principal = principal.ok_or(GatewayError::Auth(AuthError::Missing))?;
                handlers::rpc(&self.rpc, *operation, principal, request.into_body(), self.body_limit)
                    .await
            }
            Handler::PersonalizedOrProxy { operation, fallback } => match principal {
                Some(principal) => {
                    handlers::rpc(&self.rpc, *operation, principal, request.into_body(), self.body_limit)
                        .await
                }
                None => self.forwarder.forward(fallback, None, request).await,
            },
        }
    }
}

/// Axum entry point for every path.
pub async fn dispatch(State(dispatcher): State<Arc<Dispatcher>>, request: Request<Body>) -> Response {
    dispatcher.handle(request).await
}
