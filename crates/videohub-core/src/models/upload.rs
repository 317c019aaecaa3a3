use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{IMAGE_CONTENT_TYPES, VIDEO_CONTENT_TYPES};

/// Destination bucket for an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    #[default]
    Videos,
    Images,
}

impl BucketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketType::Videos => "videos",
            BucketType::Images => "images",
        }
    }

    /// MIME types a client may upload into this bucket.
    pub fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            BucketType::Videos => VIDEO_CONTENT_TYPES,
            BucketType::Images => IMAGE_CONTENT_TYPES,
        }
    }

    pub fn allows(&self, content_type: &str) -> bool {
        self.allowed_content_types().contains(&content_type)
    }
}

impl fmt::Display for BucketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "videos" => Ok(BucketType::Videos),
            "images" => Ok(BucketType::Images),
            other => Err(format!("Unknown bucket type: {}", other)),
        }
    }
}

/// Body of `POST /api/upload/presigned-url`.
///
/// Fields default to empty so that missing values surface as itemized
/// validation issues instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "File type is required"))]
    pub file_type: String,
    /// `videos` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_type: Option<String>,
}

impl UploadRequest {
    pub fn new(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        bucket_type: BucketType,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            bucket_type: Some(bucket_type.as_str().to_string()),
        }
    }
}

/// An upload request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub file_type: String,
    pub bucket_type: BucketType,
}

/// Time-limited permission to PUT one object into storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedGrant {
    pub presigned_url: String,
    pub public_url: String,
    pub key: String,
}
