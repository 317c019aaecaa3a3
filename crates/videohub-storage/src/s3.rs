use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use std::time::Duration;

/// Region identifier R2 expects from S3 clients.
const R2_REGION: &str = "auto";

/// S3 compatible storage (Cloudflare R2 in production)
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - Bucket name
    /// * `endpoint_url` - Account endpoint, e.g. `https://{account}.r2.cloudflarestorage.com`
    /// * `access_key_id` / `secret_access_key` - API token credentials
    pub fn new(
        bucket: String,
        endpoint_url: String,
        access_key_id: String,
        secret_access_key: String,
    ) -> StorageResult<Self> {
        let allow_http = endpoint_url.starts_with("http://");
        let store = AmazonS3Builder::new()
            .with_region(R2_REGION)
            .with_bucket_name(bucket.clone())
            .with_endpoint(endpoint_url)
            .with_allow_http(allow_http)
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let url = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    storage_key = %storage_key,
                    "Failed to sign upload URL"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            storage_key = %storage_key,
            content_type = %content_type,
            expires_in_secs = expires_in.as_secs(),
            "Signed upload URL"
        );

        Ok(url.to_string())
    }

    fn bucket_name(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signed_put_url_targets_bucket_key() {
        let storage = S3Storage::new(
            "videos".to_string(),
            "https://account.r2.cloudflarestorage.com".to_string(),
            "AKIDEXAMPLE".to_string(),
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
        )
        .unwrap();

        let url = storage
            .presigned_put_url(
                "videos/user-1/1700000000000-abcdefghijk.mp4",
                "video/mp4",
                Duration::from_secs(300),
            )
            .await
            .unwrap();

        assert!(url.starts_with("https://account.r2.cloudflarestorage.com/videos/"));
        assert!(url.contains("user-1/1700000000000-abcdefghijk.mp4"));
        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("X-Amz-Signature="));
        assert_eq!(storage.bucket_name(), "videos");
    }
}
