//! VideoHub Storage Library
//!
//! Object storage access for direct uploads. Clients never send bytes through
//! the API: the service signs a short-lived PUT URL and the browser uploads
//! straight to the bucket.
//!
//! # Storage key format
//!
//! `{bucketType}/{userId}/{timestampMs}-{token}.{extension}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module.

pub mod keys;
pub mod memory;
pub mod registry;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::generate_storage_key;
pub use memory::MemoryStorage;
pub use registry::{create_bucket_registry, BucketRegistry, BucketTarget};
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
