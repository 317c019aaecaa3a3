//! VideoHub Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all VideoHub components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{
    AuthGateSettings, BaseConfig, BucketSettings, Config, Enforcement, RateLimitBackend,
    RateLimitSettings, StorageSettings, SupabaseSettings,
};
pub use error::{AppError, ErrorMetadata, FieldIssue, LogLevel};
pub use models::{
    BucketType, PresignedGrant, Session, ThemePreference, ThemeUpdateRequest, UploadRequest,
    ValidatedUpload,
};
pub use validation::validate_upload_request;
