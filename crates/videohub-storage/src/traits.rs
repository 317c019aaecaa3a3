//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use videohub_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Bucket not configured: {0}")]
    NotConfigured(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotConfigured(_) | StorageError::ConfigError(_) => {
                AppError::Configuration(err.to_string())
            }
            StorageError::InvalidKey(_) | StorageError::SigningFailed(_) => {
                AppError::Storage(err.to_string())
            }
        }
    }
}

/// A single bucket that can hand out presigned upload URLs.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL for a direct upload to `storage_key`.
    ///
    /// The content type is informational for backends that cannot bind it
    /// into the signature.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Name of the underlying bucket, for logs.
    fn bucket_name(&self) -> &str;
}
