use super::gate::GateDecision;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use videohub_core::{AppError, Session};

const API_PREFIX: &str = "/api";

/// Redirects page requests according to the auth gate. API routes are left to
/// their handlers, which answer 401 themselves.
pub async fn auth_gate_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path == API_PREFIX || path.starts_with("/api/") {
        return next.run(request).await;
    }

    let session = state.sessions.session(request.headers()).await;
    let query = request.uri().query();

    match state.auth_gate.evaluate(&path, query, session.as_ref()) {
        GateDecision::Redirect(location) => {
            tracing::debug!(path = %path, location = %location, "Auth gate redirect");
            Redirect::temporary(&location).into_response()
        }
        GateDecision::Pass { headers } => {
            request.headers_mut().extend(headers.clone());
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            let mut response = next.run(request).await;
            response.headers_mut().extend(headers);
            response
        }
    }
}

/// Extractor for handlers that require a signed-in user. Rejects with 401
/// before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(AuthSession(session.clone()));
        }

        match state.sessions.session(&parts.headers).await {
            Some(session) => Ok(AuthSession(session)),
            None => Err(HttpAppError(AppError::Unauthorized(
                "Unauthorized".to_string(),
            ))),
        }
    }
}
