//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs
//! - Build the route table once and reject unreachable rules
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, ServiceName};
use crate::routing::RouteTable;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must not be empty"));
    }

    for service in ServiceName::ALL {
        let raw = config.services.url(service);
        match url::Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http") && url.host_str().is_some() => {}
            Ok(_) => errors.push(ValidationError::new(
                format!("services.{}", service),
                format!("expected an http:// URL with a host, got {:?}", raw),
            )),
            Err(e) => errors.push(ValidationError::new(
                format!("services.{}", service),
                format!("invalid URL {:?}: {}", raw, e),
            )),
        }
    }

    for (field, addr) in [
        ("rpc.stakeholder", &config.rpc.stakeholder),
        ("rpc.blog", &config.rpc.blog),
        ("rpc.purchase", &config.rpc.purchase),
    ] {
        let valid = addr
            .rsplit_once(':')
            .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::new(field, format!("expected host:port, got {:?}", addr)));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    match RouteTable::from_config(&config.routes) {
        Ok(table) => {
            for conflict in table.conflicts() {
                errors.push(ValidationError::new("routes", conflict.to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::new("routes", e.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
