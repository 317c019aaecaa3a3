//! HTTP client for the VideoHub API.
//!
//! `ApiClient` talks to the backend with the caller's access token;
//! `UploadClient` drives a browser-style direct upload on top of it: ask the
//! API for a presigned grant, then PUT the bytes straight to object storage.

pub mod upload;

pub use upload::{ProgressCallback, UploadClient, UploadFile, UploadOptions, UploadState};

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use videohub_core::{PresignedGrant, UploadRequest};

const CONTROL_TIMEOUT_SECS: u64 = 30;
const PRESIGNED_URL_PATH: &str = "/api/upload/presigned-url";

/// Why a grant request did not produce a grant.
#[derive(Debug, Error)]
pub enum GrantError {
    /// The API answered with a non-2xx status. `message` is the envelope's
    /// `error` field when the body had one.
    #[error("{}", message.clone().unwrap_or_else(|| format!("Grant request failed with status {status}")))]
    Rejected { status: u16, message: Option<String> },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the VideoHub API, authenticated with a bearer token.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CONTROL_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Create client from environment: VIDEOHUB_API_URL (or API_URL) and
    /// VIDEOHUB_ACCESS_TOKEN.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("VIDEOHUB_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let token = std::env::var("VIDEOHUB_ACCESS_TOKEN")
            .context("Missing access token. Set VIDEOHUB_ACCESS_TOKEN")?;

        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the API for a presigned PUT URL.
    pub async fn request_presigned_url(
        &self,
        request: &UploadRequest,
    ) -> Result<PresignedGrant, GrantError> {
        let response = self
            .client
            .post(self.build_url(PRESIGNED_URL_PATH))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_string));
            return Err(GrantError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
