use crate::error::HttpAppError;
use axum::http::Uri;
use videohub_core::AppError;

/// Pages are served by the frontend; anything that survives the auth gate and
/// has no API route is unknown here.
pub async fn not_found(uri: Uri) -> HttpAppError {
    HttpAppError(AppError::NotFound(format!("No route for {}", uri.path())))
}
