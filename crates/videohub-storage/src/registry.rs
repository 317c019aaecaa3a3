//! Bucket registry
//!
//! Maps each `BucketType` to its storage backend and public base URL, and
//! issues presigned grants against them.

use crate::keys::generate_storage_key;
use crate::s3::S3Storage;
use crate::traits::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use videohub_core::constants::PRESIGNED_URL_TTL_SECS;
use videohub_core::{BucketType, PresignedGrant, StorageSettings, ValidatedUpload};

/// A configured bucket.
#[derive(Clone)]
pub struct BucketTarget {
    pub storage: Arc<dyn Storage>,
    pub public_base_url: String,
}

impl BucketTarget {
    pub fn new(storage: Arc<dyn Storage>, public_base_url: impl Into<String>) -> Self {
        Self {
            storage,
            public_base_url: public_base_url.into(),
        }
    }

    pub fn public_url(&self, storage_key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            storage_key
        )
    }
}

#[derive(Clone, Default)]
pub struct BucketRegistry {
    videos: Option<BucketTarget>,
    images: Option<BucketTarget>,
}

impl BucketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, bucket_type: BucketType, target: BucketTarget) -> Self {
        match bucket_type {
            BucketType::Videos => self.videos = Some(target),
            BucketType::Images => self.images = Some(target),
        }
        self
    }

    pub fn target(&self, bucket_type: BucketType) -> StorageResult<&BucketTarget> {
        match bucket_type {
            BucketType::Videos => self.videos.as_ref(),
            BucketType::Images => self.images.as_ref(),
        }
        .ok_or_else(|| StorageError::NotConfigured(bucket_type.to_string()))
    }

    /// Derive a key for the upload and sign a PUT URL for it.
    pub async fn issue_grant(
        &self,
        user_id: &str,
        upload: &ValidatedUpload,
    ) -> StorageResult<PresignedGrant> {
        let target = self.target(upload.bucket_type)?;
        let key = generate_storage_key(
            upload.bucket_type,
            user_id,
            &upload.file_name,
            &upload.file_type,
        )?;
        let expires_in = Duration::from_secs(PRESIGNED_URL_TTL_SECS);

        let presigned_url = target
            .storage
            .presigned_put_url(&key, &upload.file_type, expires_in)
            .await?;

        tracing::info!(
            user_id = %user_id,
            bucket = %target.storage.bucket_name(),
            storage_key = %key,
            content_type = %upload.file_type,
            "Issued presigned upload URL"
        );

        Ok(PresignedGrant {
            presigned_url,
            public_url: target.public_url(&key),
            key,
        })
    }
}

/// Build the registry from settings. Buckets missing a name, public URL or
/// credentials are left unconfigured and rejected when requested.
pub fn create_bucket_registry(settings: &StorageSettings) -> StorageResult<BucketRegistry> {
    let mut registry = BucketRegistry::new();

    let credentials = match (
        settings.endpoint_url(),
        settings.access_key_id.as_ref(),
        settings.secret_access_key.as_ref(),
    ) {
        (Some(endpoint), Some(key_id), Some(secret)) => Some((endpoint, key_id, secret)),
        _ => {
            tracing::warn!(
                "R2 credentials are incomplete (R2_ACCOUNT_ID, R2_ACCESS_KEY_ID, R2_SECRET_ACCESS_KEY); uploads are disabled"
            );
            None
        }
    };

    let Some((endpoint, key_id, secret)) = credentials else {
        return Ok(registry);
    };

    for bucket_type in [BucketType::Videos, BucketType::Images] {
        let bucket = settings.bucket(bucket_type);
        match (&bucket.bucket_name, &bucket.public_url) {
            (Some(name), Some(public_url)) if bucket.is_configured() => {
                let storage =
                    S3Storage::new(name.clone(), endpoint.clone(), key_id.clone(), secret.clone())?;
                registry =
                    registry.with_bucket(bucket_type, BucketTarget::new(Arc::new(storage), public_url));
                tracing::info!(bucket_type = %bucket_type, bucket = %name, "Storage bucket configured");
            }
            _ => {
                tracing::warn!(bucket_type = %bucket_type, "Storage bucket not configured");
            }
        }
    }

    Ok(registry)
}
