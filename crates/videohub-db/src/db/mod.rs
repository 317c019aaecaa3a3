//! Database repositories for data access layer
//!
//! Each repository owns one table. Only user profiles are persisted by this
//! service; everything else lives in the auth provider or object storage.

pub mod profile;

pub use profile::{
    is_missing_column_code, InMemoryProfileRepository, PgProfileRepository,
    PostgrestProfileRepository, ProfileRepository, RepositoryError, RepositoryResult,
};
