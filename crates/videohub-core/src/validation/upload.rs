//! Upload request validation
//!
//! Field-level rules come from the `validator` derive on `UploadRequest`; the
//! bucket and content-type allow-list checks depend on each other and are
//! applied here.

use validator::Validate;

use crate::error::{AppError, FieldIssue};
use crate::models::{BucketType, UploadRequest, ValidatedUpload};

/// Validate an incoming upload request, collecting every problem found.
pub fn validate_upload_request(req: &UploadRequest) -> Result<ValidatedUpload, AppError> {
    let mut issues = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match AppError::from(errors) {
            AppError::Validation(issues) => issues,
            other => return Err(other),
        },
    };

    let bucket_type = match req.bucket_type.as_deref() {
        None => Some(BucketType::default()),
        Some(raw) => match raw.parse::<BucketType>() {
            Ok(bucket) => Some(bucket),
            Err(_) => {
                issues.push(FieldIssue::new(
                    "bucketType",
                    "Bucket type must be one of: videos, images",
                ));
                None
            }
        },
    };

    if let Some(bucket) = bucket_type {
        if !req.file_type.is_empty() && !bucket.allows(&req.file_type) {
            issues.push(FieldIssue::new(
                "fileType",
                format!(
                    "Invalid file type for {}. Allowed: {}",
                    bucket,
                    bucket.allowed_content_types().join(", ")
                ),
            ));
        }
    }

    match bucket_type {
        Some(bucket_type) if issues.is_empty() => Ok(ValidatedUpload {
            file_name: req.file_name.clone(),
            file_type: req.file_type.clone(),
            bucket_type,
        }),
        _ => Err(AppError::Validation(issues)),
    }
}
