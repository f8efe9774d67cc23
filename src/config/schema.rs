//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Defaults mirror the stock deployment so an empty file is a valid config.

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::rpc::RpcOperation;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Base URLs of the HTTP backends.
    pub services: ServicesConfig,

    /// Addresses of the RPC backends.
    pub rpc: RpcConfig,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings for the browser client.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Extra routes merged into the built-in booking table.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Identity of an HTTP backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    Auth,
    Tour,
    Blog,
    Follower,
    Stakeholder,
    Review,
    Purchase,
}

impl ServiceName {
    pub const ALL: [ServiceName; 7] = [
        ServiceName::Auth,
        ServiceName::Tour,
        ServiceName::Blog,
        ServiceName::Follower,
        ServiceName::Stakeholder,
        ServiceName::Review,
        ServiceName::Purchase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Auth => "auth",
            ServiceName::Tour => "tour",
            ServiceName::Blog => "blog",
            ServiceName::Follower => "follower",
            ServiceName::Stakeholder => "stakeholder",
            ServiceName::Review => "review",
            ServiceName::Purchase => "purchase",
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URLs of the HTTP backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub auth: String,
    pub tour: String,
    pub blog: String,
    pub follower: String,
    pub stakeholder: String,
    pub review: String,
    pub purchase: String,
}

impl ServicesConfig {
    /// Base URL configured for `service`.
    pub fn url(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::Auth => &self.auth,
            ServiceName::Tour => &self.tour,
            ServiceName::Blog => &self.blog,
            ServiceName::Follower => &self.follower,
            ServiceName::Stakeholder => &self.stakeholder,
            ServiceName::Review => &self.review,
            ServiceName::Purchase => &self.purchase,
        }
    }

    pub fn url_mut(&mut self, service: ServiceName) -> &mut String {
        match service {
            ServiceName::Auth => &mut self.auth,
            ServiceName::Tour => &mut self.tour,
            ServiceName::Blog => &mut self.blog,
            ServiceName::Follower => &mut self.follower,
            ServiceName::Stakeholder => &mut self.stakeholder,
            ServiceName::Review => &mut self.review,
            ServiceName::Purchase => &mut self.purchase,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth: "http://auth-service:3001".to_string(),
            tour: "http://tour-service:3006".to_string(),
            blog: "http://blog-service:3002".to_string(),
            follower: "http://follower-service:3005".to_string(),
            stakeholder: "http://stakeholder-service:3003".to_string(),
            review: "http://review-service:3007".to_string(),
            purchase: "http://purchase-service:8084".to_string(),
        }
    }
}

/// RPC backend addresses and call limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Stakeholder RPC endpoint (host:port).
    pub stakeholder: String,

    /// Blog RPC endpoint (host:port).
    pub blog: String,

    /// Purchase RPC endpoint (host:port).
    pub purchase: String,

    /// Deadline for one RPC call in milliseconds. Zero disables it.
    pub call_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            stakeholder: "localhost:3014".to_string(),
            blog: "localhost:3012".to_string(),
            purchase: "localhost:3013".to_string(),
            call_timeout_ms: 10_000,
        }
    }
}

/// Token verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret shared with the auth service.
    pub jwt_secret: String,

    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            jwt_secret: "your_secret_key".to_string(),
            leeway_secs: 0,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Deadline for one proxied backend exchange in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 25,
        }
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Emit one span record per request.
    pub spans_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            spans_enabled: true,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// How a configured route matches the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatch {
    Exact,
    Prefix,
}

/// Authentication requirement of a configured route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRequirementConfig {
    None,
    Optional,
    Authenticated,
    Role(Role),
}

/// Handler of a configured route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerConfig {
    Proxy {
        service: ServiceName,
        /// Prefix removed from the path; defaults to the route path.
        #[serde(default)]
        strip: Option<String>,
        #[serde(default)]
        rewrite: String,
    },
    Rpc {
        operation: RpcOperation,
    },
    Health,
}

/// Route configuration mapping requests to a handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Allowed methods; empty means any.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Path to match.
    pub path: String,

    #[serde(default = "default_path_match", rename = "match")]
    pub path_match: PathMatch,

    #[serde(default = "default_auth")]
    pub auth: AuthRequirementConfig,

    pub handler: HandlerConfig,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,
}

fn default_path_match() -> PathMatch {
    PathMatch::Prefix
}

fn default_auth() -> AuthRequirementConfig {
    AuthRequirementConfig::Authenticated
}
