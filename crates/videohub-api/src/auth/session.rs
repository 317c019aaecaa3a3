use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;
use videohub_core::constants::SESSION_COOKIE;
use videohub_core::Session;

/// Resolves the current session for a request.
///
/// Implementations never fail the request: an unknown, expired or unverifiable
/// token simply yields `None`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Access token from `Authorization: Bearer`, falling back to the session cookie.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .filter(|t| !t.is_empty())
}
