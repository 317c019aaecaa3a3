//! HTTP error response conversion
//!
//! Every failing handler renders through `HttpAppError` into one envelope:
//! `{error, code, details?, timestamp, path, requestId}`.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors so they render
//! consistently (status, body, logging).

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use videohub_core::{AppError, ErrorMetadata, LogLevel};
use videohub_infra::{current_request_context, RateLimitOutcome};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Field issues for validation failures; diagnostics outside production otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from videohub-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<videohub_storage::StorageError> for HttpAppError {
    fn from(err: videohub_storage::StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<videohub_db::RepositoryError> for HttpAppError {
    fn from(err: videohub_db::RepositoryError) -> Self {
        HttpAppError(err.into())
    }
}

/// Convert JSON body deserialization failures into a 400 with our envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected request body");
        HttpAppError(AppError::InvalidInput("Invalid request body".to_string()))
    }
}

/// JSON body extractor that returns our envelope (400 + JSON) on deserialization failure.
/// Use this instead of `Json<T>` when you want a consistent API error shape for invalid bodies.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| videohub_core::config::is_production_environment(&env))
        .unwrap_or(false)
}

fn error_details(app_error: &AppError, is_production: bool) -> Option<serde_json::Value> {
    if let Some(issues) = app_error.issues() {
        return serde_json::to_value(issues).ok();
    }
    if app_error.is_sensitive() && !is_production {
        return Some(serde_json::Value::String(app_error.detailed_message()));
    }
    None
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let context = current_request_context();
        let body = ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            details: error_details(app_error, is_production_env()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            path: context.as_ref().map(|c| c.path.clone()),
            request_id: context.map(|c| c.request_id),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited {
            limit,
            remaining,
            reset,
        } = *app_error
        {
            let outcome = RateLimitOutcome::new(false, limit, remaining, reset);
            response.headers_mut().extend(outcome.headers);

            let now_ms = chrono::Utc::now().timestamp_millis();
            let retry_after = ((reset - now_ms) as f64 / 1000.0).ceil().max(1.0) as u64;
            if let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", header_value);
            }
        }

        response
    }
}
