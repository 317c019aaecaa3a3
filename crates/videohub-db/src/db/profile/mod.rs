//! User profile repositories
//!
//! The theme preference lives in the `theme_preference` column of `profiles`.
//! Older databases may not have that column yet; every backend reports that
//! case as `RepositoryError::MissingColumn` so callers can degrade instead of
//! failing.

mod memory;
mod postgres;
mod postgrest;

pub use memory::InMemoryProfileRepository;
pub use postgres::PgProfileRepository;
pub use postgrest::PostgrestProfileRepository;

use async_trait::async_trait;
use thiserror::Error;
use videohub_core::{AppError, Session, ThemePreference};

pub(crate) const PROFILES_TABLE: &str = "profiles";
pub(crate) const THEME_COLUMN: &str = "theme_preference";

/// Postgres SQLSTATE `undefined_column`.
const UNDEFINED_COLUMN: &str = "42703";
/// PostgREST: column not found in the schema cache.
const POSTGREST_UNKNOWN_COLUMN: &str = "PGRST204";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Column {0} does not exist")]
    MissingColumn(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        let code = match &err {
            sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
            _ => None,
        };
        classify_database_error(code.as_deref(), err.to_string())
    }
}

/// Map a database failure to a repository error by its error code.
pub(crate) fn classify_database_error(code: Option<&str>, message: String) -> RepositoryError {
    if code.is_some_and(is_missing_column_code) {
        RepositoryError::MissingColumn(THEME_COLUMN.to_string())
    } else {
        RepositoryError::Database(message)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Error codes meaning "the column you referenced does not exist".
pub fn is_missing_column_code(code: &str) -> bool {
    code == UNDEFINED_COLUMN || code == POSTGREST_UNKNOWN_COLUMN
}

/// Read and write the caller's own profile.
///
/// The session is passed whole so that backends going through the auth
/// provider can forward the user's access token.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Stored preference, `None` when the profile has none.
    async fn get_theme(&self, session: &Session) -> RepositoryResult<Option<ThemePreference>>;

    async fn set_theme(&self, session: &Session, theme: ThemePreference) -> RepositoryResult<()>;
}

/// Stored values outside the known set are treated as unset.
pub(crate) fn parse_stored_theme(user_id: &str, raw: Option<String>) -> Option<ThemePreference> {
    let raw = raw?;
    match raw.parse() {
        Ok(theme) => Some(theme),
        Err(_) => {
            tracing::warn!(user_id = %user_id, value = %raw, "Ignoring unknown stored theme preference");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_codes() {
        assert!(is_missing_column_code("42703"));
        assert!(is_missing_column_code("PGRST204"));
        assert!(!is_missing_column_code("42P01"));
        assert!(!is_missing_column_code("PGRST116"));
    }

    #[test]
    fn test_undefined_column_maps_to_missing_column() {
        let err = classify_database_error(
            Some("42703"),
            "column \"theme_preference\" does not exist".to_string(),
        );
        assert!(matches!(err, RepositoryError::MissingColumn(ref c) if c == "theme_preference"));

        let err = classify_database_error(Some("42P01"), "relation does not exist".to_string());
        assert!(matches!(err, RepositoryError::Database(ref m) if m == "relation does not exist"));

        let err = classify_database_error(None, "connection reset".to_string());
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn test_non_database_sqlx_error_is_database_error() {
        let err = RepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn test_parse_stored_theme() {
        assert_eq!(
            parse_stored_theme("u", Some("dark".to_string())),
            Some(ThemePreference::Dark)
        );
        assert_eq!(parse_stored_theme("u", Some("neon".to_string())), None);
        assert_eq!(parse_stored_theme("u", None), None);
    }
}
