//! Credential extraction from the websocket handshake.

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// Header carrying the raw access token.
pub const AUTHENTICATION_HEADER: &str = "authentication";

const BEARER_PREFIX: &str = "Bearer ";

/// Pick the credential token out of the upgrade request.
///
/// Precedence: `authentication` header, then `Authorization: Bearer`, then
/// the `token` query parameter. Blank values count as absent.
pub fn extract_credential(headers: &HeaderMap, query_token: Option<&str>) -> Option<String> {
    let from_authentication = headers
        .get(AUTHENTICATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value));

    let from_authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    [from_authentication, from_authorization, query_token]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}
