//! Route lookup.
//!
//! # Responsibilities
//! - Store rules in evaluation order
//! - Look up the first rule matching method + path
//! - Report duplicate and shadowed rules before the table goes live
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Ordered by explicit priority, registration order breaks ties
//! - O(n) scan (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use axum::http::Method;

use crate::config::schema::RouteConfig;
use crate::routing::rule::RouteRule;
use crate::routing::table::booking_routes;
use crate::routing::RouteError;

/// A rule that can never be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConflict {
    pub shadowed: String,
    pub by: String,
}

impl std::fmt::Display for RouteConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "route '{}' is unreachable behind '{}'", self.shadowed, self.by)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table from rules in registration order.
    pub fn new(mut rules: Vec<RouteRule>) -> Self {
        // Stable: equal priorities keep registration order.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// The built-in booking table plus configured routes.
    pub fn from_config(extra: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut rules = booking_routes();
        for route in extra {
            rules.push(RouteRule::try_from(route)?);
        }
        Ok(Self::new(rules))
    }

    /// First rule matching `method` and `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Every rule that an earlier rule makes unreachable.
    pub fn conflicts(&self) -> Vec<RouteConflict> {
        let mut conflicts = Vec::new();
        for (j, later) in self.rules.iter().enumerate() {
            if let Some(earlier) = self.rules[..j].iter().find(|earlier| earlier.shadows(later)) {
                conflicts.push(RouteConflict {
                    shadowed: later.name.clone(),
                    by: earlier.name.clone(),
                });
            }
        }
        conflicts
    }
}
