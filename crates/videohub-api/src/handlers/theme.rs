//! Theme preference endpoints
//!
//! Both routes require a session and are limited per user by the `theme`
//! limiter. A database without `profiles.theme_preference` is tolerated: reads
//! fall back to `system` and writes report `persisted: false`.

use crate::auth::AuthSession;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use videohub_core::{ThemePreference, ThemeUpdateRequest};
use videohub_db::RepositoryError;
use videohub_infra::with_rate_limit;

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: ThemePreference,
}

#[derive(Debug, Serialize)]
pub struct ThemeUpdateResponse {
    pub success: bool,
    pub theme: ThemePreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn get_theme(
    AuthSession(session): AuthSession,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let outcome = with_rate_limit(&headers, &state.theme_limiter, Some(&session.user_id))
        .await
        .into_result()?;

    let theme = match state.profiles.get_theme(&session).await {
        Ok(theme) => theme.unwrap_or_default(),
        Err(RepositoryError::MissingColumn(column)) => {
            tracing::warn!(column = %column, "Theme column missing; returning default theme");
            ThemePreference::default()
        }
        Err(e) => return Err(e.into()),
    };

    Ok((outcome.headers, Json(ThemeResponse { theme })).into_response())
}

pub async fn update_theme(
    AuthSession(session): AuthSession,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ThemeUpdateRequest>,
) -> Result<Response, HttpAppError> {
    let outcome = with_rate_limit(&headers, &state.theme_limiter, Some(&session.user_id))
        .await
        .into_result()?;

    let theme = request.preference()?;

    let body = match state.profiles.set_theme(&session, theme).await {
        Ok(()) => {
            tracing::info!(user_id = %session.user_id, theme = %theme, "Theme preference updated");
            ThemeUpdateResponse {
                success: true,
                theme,
                persisted: None,
                message: None,
            }
        }
        Err(RepositoryError::MissingColumn(column)) => {
            tracing::warn!(column = %column, "Theme column missing; preference not persisted");
            ThemeUpdateResponse {
                success: true,
                theme,
                persisted: Some(false),
                message: Some(
                    "Theme preference could not be saved because the profile column is missing"
                        .to_string(),
                ),
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok((outcome.headers, Json(body)).into_response())
}
