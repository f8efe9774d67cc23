//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::{GatewayConfig, ServiceName};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply deployment environment variables on top of `config`.
///
/// `lookup` abstracts the environment so the mapping can be tested without
/// mutating process state.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }

    if let Some(port) = lookup("API_GATEWAY_PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            key: "API_GATEWAY_PORT".to_string(),
            value: port.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    for service in ServiceName::ALL {
        let prefix = service.as_str().to_uppercase();
        if let Some(url) = lookup(&format!("{}_SERVICE_URL", prefix)) {
            *config.services.url_mut(service) = url;
            continue;
        }
        let host = lookup(&format!("{}_SERVICE_HOST", prefix));
        let port = lookup(&format!("{}_SERVICE_PORT", prefix));
        if host.is_some() || port.is_some() {
            let current = url::Url::parse(config.services.url(service)).ok();
            let host = host
                .or_else(|| current.as_ref().and_then(|u| u.host_str().map(str::to_string)))
                .unwrap_or_else(|| format!("{}-service", service.as_str()));
            let port = port
                .or_else(|| current.as_ref().and_then(|u| u.port()).map(|p| p.to_string()))
                .unwrap_or_else(|| "80".to_string());
            *config.services.url_mut(service) = format!("http://{}:{}", host, port);
        }
    }

    if let Some(addr) = lookup("STAKEHOLDER_RPC_ADDR") {
        config.rpc.stakeholder = addr;
    }
    if let Some(addr) = lookup("BLOG_RPC_ADDR") {
        config.rpc.blog = addr;
    }
    if let Some(addr) = lookup("PURCHASE_RPC_ADDR") {
        config.rpc.purchase = addr;
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}
