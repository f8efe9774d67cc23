//! Route rules.
//!
//! A rule pairs a matcher (method + path) with an auth requirement and a
//! handler. Rules are immutable once the table is built.

use axum::http::Method;

use crate::auth::AuthRequirement;
use crate::config::schema::{
    AuthRequirementConfig, HandlerConfig, PathMatch, RouteConfig, ServiceName,
};
use crate::routing::matcher::{MethodFilter, PathPattern};
use crate::routing::RouteError;
use crate::rpc::RpcOperation;

/// Prefix substitution applied before forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    strip: String,
    replace: String,
}

impl PathRewrite {
    pub fn new(strip: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            strip: strip.into(),
            replace: replace.into(),
        }
    }

    /// Rewrite `path`. An empty result becomes `/`.
    pub fn apply(&self, path: &str) -> String {
        let rewritten = match path.strip_prefix(self.strip.as_str()) {
            Some(rest) => format!("{}{}", self.replace, rest),
            None => path.to_string(),
        };
        if rewritten.is_empty() {
            "/".to_string()
        } else if !rewritten.starts_with('/') {
            format!("/{}", rewritten)
        } else {
            rewritten
        }
    }
}

/// Backend HTTP service a rule forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub service: ServiceName,
    pub rewrite: PathRewrite,
}

impl ProxyTarget {
    pub fn new(service: ServiceName, rewrite: PathRewrite) -> Self {
        Self { service, rewrite }
    }
}

/// What runs once a rule matched and auth passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    Proxy(ProxyTarget),
    Rpc(RpcOperation),
    /// RPC for an authenticated caller, proxy for an anonymous one.
    PersonalizedOrProxy {
        operation: RpcOperation,
        fallback: ProxyTarget,
    },
    Health,
}

impl Handler {
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Proxy(_) => "proxy",
            Handler::Rpc(_) => "rpc",
            Handler::PersonalizedOrProxy { .. } => "personalized",
            Handler::Health => "health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub name: String,
    pub methods: MethodFilter,
    pub pattern: PathPattern,
    pub auth: AuthRequirement,
    pub handler: Handler,
    /// Higher is evaluated first; ties keep registration order.
    pub priority: u32,
}

impl RouteRule {
    /// A rule with no auth, no priority and a health handler; refine with the builder methods.
    pub fn new(name: impl Into<String>, methods: MethodFilter, pattern: PathPattern) -> Self {
        Self {
            name: name.into(),
            methods,
            pattern,
            auth: AuthRequirement::None,
            handler: Handler::Health,
            priority: 0,
        }
    }

    pub fn auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = handler;
        self
    }

    /// Proxy to `service`, replacing `strip` with `replace`.
    pub fn proxy(self, service: ServiceName, strip: &str, replace: &str) -> Self {
        self.handler(Handler::Proxy(ProxyTarget::new(
            service,
            PathRewrite::new(strip, replace),
        )))
    }

    pub fn rpc(self, operation: RpcOperation) -> Self {
        self.handler(Handler::Rpc(operation))
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.methods.matches(method) && self.pattern.matches(path)
    }

    /// True when no request can reach `other` once `self` sits before it.
    pub fn shadows(&self, other: &RouteRule) -> bool {
        self.methods.covers(&other.methods) && self.pattern.covers(&other.pattern)
    }
}

impl TryFrom<&RouteConfig> for RouteRule {
    type Error = RouteError;

    fn try_from(config: &RouteConfig) -> Result<Self, Self::Error> {
        if !config.path.starts_with('/') {
            return Err(RouteError::InvalidPath {
                route: config.name.clone(),
                path: config.path.clone(),
            });
        }

        let methods = if config.methods.is_empty() || config.methods.iter().any(|m| m == "*") {
            MethodFilter::Any
        } else {
            let parsed = config
                .methods
                .iter()
                .map(|m| {
                    Method::from_bytes(m.to_uppercase().as_bytes()).map_err(|_| {
                        RouteError::InvalidMethod {
                            route: config.name.clone(),
                            method: m.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            MethodFilter::Only(parsed)
        };

        let pattern = match config.path_match {
            PathMatch::Exact => PathPattern::exact(config.path.clone()),
            PathMatch::Prefix => PathPattern::prefix(config.path.clone()),
        };

        let auth = match config.auth {
            AuthRequirementConfig::None => AuthRequirement::None,
            AuthRequirementConfig::Optional => AuthRequirement::Optional,
            AuthRequirementConfig::Authenticated => AuthRequirement::Authenticated,
            AuthRequirementConfig::Role(role) => AuthRequirement::Role(role),
        };

        let handler = match &config.handler {
            HandlerConfig::Proxy { service, strip, rewrite } => {
                let strip = strip.clone().unwrap_or_else(|| pattern.as_str().to_string());
                Handler::Proxy(ProxyTarget::new(*service, PathRewrite::new(strip, rewrite.clone())))
            }
            HandlerConfig::Rpc { operation } => {
                if matches!(auth, AuthRequirement::None | AuthRequirement::Optional) {
                    return Err(RouteError::AnonymousRpc {
                        route: config.name.clone(),
                    });
                }
                Handler::Rpc(*operation)
            }
            HandlerConfig::Health => Handler::Health,
        };

        Ok(RouteRule {
            name: config.name.clone(),
            methods,
            pattern,
            auth,
            handler,
            priority: config.priority,
        })
    }
}
