//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers
//! - Strip client-supplied identity headers
//! - Assert the authenticated identity to backends
//!
//! # Design Decisions
//! - Never trust existing identity headers from the client: backends rely
//!   on them without re-verifying the token

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

use crate::auth::Principal;

pub const X_USERNAME: HeaderName = HeaderName::from_static("x-username");
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");

fn hop_by_hop() -> [HeaderName; 7] {
    [
        header::CONNECTION,
        HeaderName::from_static("keep-alive"),
        HeaderName::from_static("proxy-connection"),
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::UPGRADE,
    ]
}

/// Remove headers that only describe the client connection.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named by Connection are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named.into_iter().chain(hop_by_hop()) {
        headers.remove(&name);
    }
    headers.remove(header::TRANSFER_ENCODING);
}

pub fn strip_identity_headers(headers: &mut HeaderMap) {
    headers.remove(X_USERNAME);
    headers.remove(X_USER_ROLE);
}

/// Set `x-username` / `x-user-role` from `principal`.
pub fn apply_identity_headers(
    headers: &mut HeaderMap,
    principal: &Principal,
) -> Result<(), InvalidHeaderValue> {
    let username = HeaderValue::from_bytes(principal.username.as_bytes())?;
    headers.insert(X_USERNAME, username);
    headers.insert(X_USER_ROLE, HeaderValue::from_static(principal.role.as_str()));
    Ok(())
}
