//! Page auth gate
//!
//! Decides, for a page request, whether to let it through or redirect. Protected
//! pages require a session; auth-only pages (login, signup) bounce users that
//! already have one.

use axum::http::{HeaderMap, HeaderValue};
use videohub_core::constants::{USER_EMAIL_HEADER, USER_ID_HEADER};
use videohub_core::{AuthGateSettings, Session};

const LOGIN_PATH: &str = "/login";
const REDIRECT_PARAM: &str = "redirectTo";

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Continue, with headers to add to the forwarded request and the response.
    Pass { headers: HeaderMap },
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    protected: Vec<String>,
    auth_only: Vec<String>,
}

impl AuthGate {
    pub fn new(protected: Vec<String>, auth_only: Vec<String>) -> Self {
        Self {
            protected,
            auth_only,
        }
    }

    pub fn from_settings(settings: &AuthGateSettings) -> Self {
        Self::new(
            settings.protected_routes.clone(),
            settings.auth_only_routes.clone(),
        )
    }

    pub fn evaluate(&self, path: &str, query: Option<&str>, session: Option<&Session>) -> GateDecision {
        let is_protected = self.protected.iter().any(|r| matches_route(path, r));
        let is_auth_only = self.auth_only.iter().any(|r| matches_route(path, r));

        match session {
            None if is_protected => GateDecision::Redirect(format!(
                "{}?{}={}",
                LOGIN_PATH,
                REDIRECT_PARAM,
                urlencoding::encode(path)
            )),
            Some(_) if is_auth_only => {
                let target = query
                    .and_then(redirect_param)
                    .filter(|target| is_safe_redirect(target))
                    .unwrap_or_else(|| "/".to_string());
                GateDecision::Redirect(target)
            }
            _ => GateDecision::Pass {
                headers: session.map(session_headers).unwrap_or_default(),
            },
        }
    }
}

/// `/upload` matches `/upload` and `/upload/x`, not `/uploads`.
fn matches_route(path: &str, route: &str) -> bool {
    let route = route.trim_end_matches('/');
    if route.is_empty() {
        return true;
    }
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// First `redirectTo` value; form-decoded, so `+` is a space and `%2B` a plus.
fn redirect_param(query: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .unwrap_or_default()
        .into_iter()
        .find(|(name, _)| name == REDIRECT_PARAM)
        .map(|(_, value)| value)
}

/// Same-origin relative paths only.
fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

fn session_headers(session: &Session) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&session.user_id) {
        headers.insert(USER_ID_HEADER, value);
    }
    if let Some(value) = session
        .email
        .as_deref()
        .and_then(|email| HeaderValue::from_str(email).ok())
    {
        headers.insert(USER_EMAIL_HEADER, value);
    }
    headers
}
