//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (any, or an explicit set)
//! - Match path exactly or by segment-aligned prefix
//! - Decide whether one matcher covers another (shadow detection)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api/tours` as a prefix matches `/api/tours` and `/api/tours/42`,
//!   never `/api/toursx`
//! - A single trailing slash is ignored on exact matches
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// Methods a rule accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Vec<Method>),
}

impl MethodFilter {
    pub fn only<I: IntoIterator<Item = Method>>(methods: I) -> Self {
        MethodFilter::Only(methods.into_iter().collect())
    }

    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(methods) => methods.contains(method),
        }
    }

    /// True when every method accepted by `other` is accepted by `self`.
    pub fn covers(&self, other: &MethodFilter) -> bool {
        match (self, other) {
            (MethodFilter::Any, _) => true,
            (MethodFilter::Only(_), MethodFilter::Any) => false,
            (MethodFilter::Only(mine), MethodFilter::Only(theirs)) => {
                theirs.iter().all(|m| mine.contains(m))
            }
        }
    }
}

impl std::fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(methods) => {
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 { f.write_str("|")?; }
                    f.write_str(m.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// Path condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn exact(path: impl Into<String>) -> Self {
        PathPattern::Exact(normalize(path.into()))
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        PathPattern::Prefix(normalize(path.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Exact(p) | PathPattern::Prefix(p) => p,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(expected) => trim_trailing_slash(path) == expected,
            PathPattern::Prefix(prefix) => prefix_matches(prefix, path),
        }
    }

    /// True when every path matched by `other` is matched by `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        match (self, other) {
            (PathPattern::Exact(mine), PathPattern::Exact(theirs)) => mine == theirs,
            (PathPattern::Exact(_), PathPattern::Prefix(_)) => false,
            (PathPattern::Prefix(mine), other) => prefix_matches(mine, other.as_str()),
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Exact(p) => f.write_str(p),
            PathPattern::Prefix(p) if p == "/" => f.write_str("/*"),
            PathPattern::Prefix(p) => write!(f, "{}/*", p),
        }
    }
}

fn normalize(path: String) -> String {
    let trimmed = trim_trailing_slash(&path);
    if trimmed.len() == path.len() {
        path
    } else {
        trimmed.to_string()
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
