//! Direct upload client
//!
//! `Idle → RequestingGrant → Uploading → Succeeded | Failed`
//!
//! Failures never escape as errors: they are recorded on the client
//! (`error()`, progress reset to 0, no public URL) and `upload_file` returns
//! `None`.

use crate::{ApiClient, GrantError};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::sync::{Arc, Mutex, MutexGuard};
use videohub_core::{BucketType, UploadRequest};

const GRANT_PROGRESS: u8 = 25;
const COMPLETE_PROGRESS: u8 = 100;
const GRANT_FAILED: &str = "Failed to get upload URL";

pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    RequestingGrant,
    Uploading,
    Succeeded,
    Failed,
}

/// A file held in memory, ready to be sent as one PUT body.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Clone, Default)]
pub struct UploadOptions {
    pub bucket_type: BucketType,
    /// Called with 25 once the grant is received and 100 once the PUT succeeds.
    pub on_progress: Option<ProgressCallback>,
}

impl UploadOptions {
    pub fn bucket(bucket_type: BucketType) -> Self {
        Self {
            bucket_type,
            on_progress: None,
        }
    }

    pub fn on_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: UploadState,
    progress: u8,
    public_url: Option<String>,
    error: Option<String>,
}

pub struct UploadClient {
    api: ApiClient,
    /// Storage PUTs may take long; no request timeout.
    storage: reqwest::Client,
    inner: Mutex<Inner>,
}

impl UploadClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            storage: reqwest::Client::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Upload `file` and return its public URL, or `None` after recording the
    /// failure.
    pub async fn upload_file(&self, file: &UploadFile, options: UploadOptions) -> Option<String> {
        self.update(|inner| {
            *inner = Inner {
                state: UploadState::RequestingGrant,
                ..Inner::default()
            };
        });

        let request = UploadRequest::new(&file.name, &file.content_type, options.bucket_type);
        let grant = match self.api.request_presigned_url(&request).await {
            Ok(grant) => grant,
            Err(GrantError::Rejected { status, message }) => {
                tracing::warn!(status, error = ?message, "Presigned URL request rejected");
                return self.fail(message.unwrap_or_else(|| GRANT_FAILED.to_string()));
            }
            Err(GrantError::Transport(e)) => return self.fail(e.to_string()),
        };

        self.update(|inner| {
            inner.state = UploadState::Uploading;
            inner.progress = GRANT_PROGRESS;
        });
        notify(&options, GRANT_PROGRESS);

        let response = self
            .storage
            .put(&grant.presigned_url)
            .header(CONTENT_TYPE, &file.content_type)
            .body(file.bytes.clone())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                self.update(|inner| {
                    inner.state = UploadState::Succeeded;
                    inner.progress = COMPLETE_PROGRESS;
                    inner.public_url = Some(grant.public_url.clone());
                });
                notify(&options, COMPLETE_PROGRESS);
                tracing::info!(key = %grant.key, "Upload complete");
                Some(grant.public_url)
            }
            Ok(response) => {
                let status = response.status();
                self.fail(format!(
                    "Upload failed: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ))
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Back to `Idle`, clearing progress, URL and error.
    pub fn reset(&self) {
        self.update(|inner| *inner = Inner::default());
    }

    pub fn state(&self) -> UploadState {
        self.lock().state
    }

    pub fn progress(&self) -> u8 {
        self.lock().progress
    }

    pub fn public_url(&self) -> Option<String> {
        self.lock().public_url.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(
            self.lock().state,
            UploadState::RequestingGrant | UploadState::Uploading
        )
    }

    fn fail(&self, error: String) -> Option<String> {
        tracing::warn!(error = %error, "Upload failed");
        self.update(|inner| {
            inner.state = UploadState::Failed;
            inner.progress = 0;
            inner.public_url = None;
            inner.error = Some(error);
        });
        None
    }

    fn update(&self, f: impl FnOnce(&mut Inner)) {
        f(&mut self.lock());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn notify(options: &UploadOptions, progress: u8) {
    if let Some(callback) = &options.on_progress {
        callback(progress);
    }
}
