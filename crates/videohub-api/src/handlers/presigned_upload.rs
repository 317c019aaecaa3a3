use crate::auth::AuthSession;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use videohub_core::{validate_upload_request, UploadRequest};

/// Issue a presigned PUT URL so the browser can upload straight to the bucket.
///
/// Authentication is checked by the `AuthSession` extractor before the body is
/// read, so an anonymous request never reaches storage.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %session.user_id,
        file_type = %request.file_type,
        operation = "create_presigned_url"
    )
)]
pub async fn create_presigned_url(
    AuthSession(session): AuthSession,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = validate_upload_request(&request)?;
    let grant = state.buckets.issue_grant(&session.user_id, &upload).await?;
    Ok(Json(grant))
}
