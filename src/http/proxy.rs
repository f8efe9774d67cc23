//! Reverse-proxy forwarding to the HTTP backends.
//!
//! # Responsibilities
//! - Resolve a `ProxyTarget` to the configured service base URL
//! - Rewrite the path prefix, keep the query string
//! - Rewrite `Host` to the target authority
//! - Replace client identity headers with the gateway's own assertion
//! - Stream the backend response back unchanged
//!
//! # Design Decisions
//! - One pooled hyper-util client shared by every service
//! - The deadline covers connect and response head; bodies stream through
//! - No retries: non-idempotent calls pass through this path too

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, Response, Uri, Version,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::auth::Principal;
use crate::config::schema::{ServiceName, ServicesConfig};
use crate::http::response::GatewayError;
use crate::resilience::timeouts::with_deadline;
use crate::routing::rule::ProxyTarget;
use crate::security::headers::{apply_identity_headers, strip_hop_by_hop, strip_identity_headers};

#[derive(Debug, Error)]
#[error("invalid base URL for service {service}: {reason}")]
pub struct UpstreamUrlError {
    pub service: ServiceName,
    pub reason: String,
}

/// Parsed base URL of one backend service.
#[derive(Debug, Clone)]
struct Upstream {
    authority: Authority,
    base_path: String,
}

impl Upstream {
    fn parse(service: ServiceName, raw: &str) -> Result<Self, UpstreamUrlError> {
        let error = |reason: String| UpstreamUrlError { service, reason };

        let url = url::Url::parse(raw).map_err(|e| error(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(error(format!("unsupported scheme '{}'", url.scheme())));
        }
        let host = url.host_str().ok_or_else(|| error("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| error(e.to_string()))?;

        Ok(Self {
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    fn uri(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut target = format!("{}{}", self.base_path, path);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        let path_and_query = PathAndQuery::from_str(&target)?;
        Ok(Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }
}

/// Forwards requests to the HTTP backends.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstreams: HashMap<ServiceName, Upstream>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(services: &ServicesConfig, timeout: Duration) -> Result<Self, UpstreamUrlError> {
        let upstreams = ServiceName::ALL
            .into_iter()
            .map(|service| Ok((service, Upstream::parse(service, services.url(service))?)))
            .collect::<Result<HashMap<_, _>, UpstreamUrlError>>()?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            upstreams,
            timeout,
        })
    }

    /// Forward `request` to `target`, asserting `principal` when present.
    pub async fn forward(
        &self,
        target: &ProxyTarget,
        principal: Option<&Principal>,
        request: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let upstream = self
            .upstreams
            .get(&target.service)
            .ok_or(GatewayError::UpstreamUnavailable)?;

        let (mut parts, body) = request.into_parts();
        let path = target.rewrite.apply(parts.uri.path());
        let uri = upstream
            .uri(&path, parts.uri.query())
            .map_err(|e| GatewayError::BadRequest(format!("Invalid request target: {}", e)))?;

        strip_hop_by_hop(&mut parts.headers);
        strip_identity_headers(&mut parts.headers);
        if let Some(principal) = principal {
            apply_identity_headers(&mut parts.headers, principal).map_err(|_| {
                GatewayError::BadRequest("Identity cannot be forwarded".to_string())
            })?;
        }
        if let Ok(host) = HeaderValue::from_str(upstream.authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }

        tracing::debug!(
            service = %target.service,
            upstream = %uri,
            method = %parts.method,
            "Forwarding request"
        );

        parts.uri = uri;
        parts.version = Version::HTTP_11;
        let outbound = Request::from_parts(parts, body);

        match with_deadline(self.timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => {
                let mut response = response.map(Body::new);
                strip_hop_by_hop(response.headers_mut());
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::error!(service = %target.service, error = %e, "Upstream error");
                Err(GatewayError::UpstreamUnavailable)
            }
            Err(_) => {
                tracing::error!(
                    service = %target.service,
                    timeout_secs = self.timeout.as_secs(),
                    "Upstream timed out"
                );
                Err(GatewayError::UpstreamTimeout)
            }
        }
    }
}
