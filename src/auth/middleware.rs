//! Bearer token authentication and role gating.
//!
//! # Failure ladder
//! ```text
//! no Authorization header          → 401 AuthMissing
//! not "Bearer <token>"             → 401 AuthMalformed
//! bad signature / expired          → 403 AuthInvalidOrExpired
//! empty username or unknown role   → 403 AuthIncompleteClaims
//! role mismatch on gated route     → 403 Forbidden
//! ```

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
use thiserror::Error;

use crate::auth::token::{Claims, TokenKeys};
use crate::auth::{Principal, Role};

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Never inspects the Authorization header.
    None,
    /// Authenticates when a header is present, anonymous otherwise.
    Optional,
    Authenticated,
    Role(Role),
}

/// Authentication failures. Resolved inside the gateway, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Malformed Authorization header: expected 'Bearer <token>'")]
    Malformed,

    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("Invalid token: missing required fields (username and role)")]
    IncompleteClaims,

    #[error("Forbidden: requires role {required}")]
    Forbidden { required: Role, actual: Role },
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Missing | AuthError::Malformed => StatusCode::UNAUTHORIZED,
            AuthError::InvalidOrExpired
            | AuthError::IncompleteClaims
            | AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::Malformed => "malformed",
            AuthError::InvalidOrExpired => "invalid_or_expired",
            AuthError::IncompleteClaims => "incomplete_claims",
            AuthError::Forbidden { .. } => "role_forbidden",
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(value: &HeaderValue) -> Result<&str, AuthError> {
    let value = value.to_str().map_err(|_| AuthError::Malformed)?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::Malformed),
    }
}

/// Verifies tokens against the shared secret. Immutable after startup.
#[derive(Debug)]
pub struct Authenticator {
    keys: TokenKeys,
}

impl Authenticator {
    pub fn new(keys: TokenKeys) -> Self {
        Self { keys }
    }

    /// Authenticate a raw Authorization header value.
    pub fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Principal, AuthError> {
        let header = header.ok_or(AuthError::Missing)?;
        let token = bearer_token(header)?;

        let claims = self.keys.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::InvalidOrExpired
        })?;

        principal_from_claims(claims)
    }

    /// Apply `requirement` to a request's headers.
    ///
    /// Returns `Ok(None)` only for anonymous access to `None`/`Optional` routes.
    pub fn authorize(
        &self,
        requirement: AuthRequirement,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, AuthError> {
        let header = headers.get(AUTHORIZATION);
        match requirement {
            AuthRequirement::None => Ok(None),
            AuthRequirement::Optional if header.is_none() => Ok(None),
            AuthRequirement::Optional | AuthRequirement::Authenticated => {
                self.authenticate(header).map(Some)
            }
            AuthRequirement::Role(required) => {
                let principal = self.authenticate(header)?;
                if !principal.has_role(required) {
                    return Err(AuthError::Forbidden {
                        required,
                        actual: principal.role,
                    });
                }
                Ok(Some(principal))
            }
        }
    }
}

fn principal_from_claims(claims: Claims) -> Result<Principal, AuthError> {
    let username = claims
        .username
        .filter(|u| !u.is_empty())
        .ok_or(AuthError::IncompleteClaims)?;
    let role = claims
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .ok_or(AuthError::IncompleteClaims)?;

    Ok(Principal {
        username,
        role,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}
