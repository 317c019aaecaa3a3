//! Client identification for rate limiting
//!
//! Requests reach the service through Cloudflare or another proxy, so the
//! socket address is not the client. The identifier is taken from forwarding
//! headers in this order:
//! 1. `cf-connecting-ip`
//! 2. first entry of `x-forwarded-for`
//! 3. `x-real-ip`
//!
//! and falls back to `"unknown"`, which makes all unidentified clients share
//! one bucket.

use axum::http::HeaderMap;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract the client identifier from request headers. Values are used as
/// sent; a present but blank header falls through to the next one.
pub fn client_identifier(headers: &HeaderMap) -> String {
    header_value(headers, "cf-connecting-ip")
        .or_else(|| {
            header_value(headers, "x-forwarded-for")
                .and_then(|value| value.split(',').next().map(str::trim))
                .filter(|first| !first.is_empty())
        })
        .or_else(|| header_value(headers, "x-real-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
