//! In-process storage backend.
//!
//! Produces deterministic fake signed URLs and records every signing request,
//! so tests can assert on what would have been signed.

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub storage_key: String,
    pub content_type: String,
    pub expires_in: Duration,
}

pub struct MemoryStorage {
    bucket: String,
    base_url: String,
    requests: Mutex<Vec<SignRequest>>,
    fail: AtomicBool,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: base_url.into(),
            requests: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make subsequent signing calls fail.
    pub fn fail_signing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<SignRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(SignRequest {
                storage_key: storage_key.to_string(),
                content_type: content_type.to_string(),
                expires_in,
            });
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed(
                "memory storage configured to fail".to_string(),
            ));
        }

        Ok(format!(
            "{}/{}/{}?expires={}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            storage_key,
            expires_in.as_secs()
        ))
    }

    fn bucket_name(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests() {
        let storage = MemoryStorage::new("videos", "http://storage.local/");
        let url = storage
            .presigned_put_url("videos/u/1-a.mp4", "video/mp4", Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(url, "http://storage.local/videos/videos/u/1-a.mp4?expires=300");
        assert_eq!(storage.request_count(), 1);
        assert_eq!(storage.requests()[0].content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let storage = MemoryStorage::new("videos", "http://storage.local");
        storage.fail_signing(true);
        let result = storage
            .presigned_put_url("k", "video/mp4", Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }
}
