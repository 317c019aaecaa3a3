use super::{ProfileRepository, RepositoryError, RepositoryResult, THEME_COLUMN};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use videohub_core::{Session, ThemePreference};

/// Process-local profile store.
///
/// Can simulate a database without the theme column, and counts calls so
/// callers can assert that no database access happened.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    themes: RwLock<HashMap<String, ThemePreference>>,
    missing_column: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave like a schema where `profiles.theme_preference` does not exist.
    pub fn without_theme_column() -> Self {
        let repo = Self::default();
        repo.missing_column.store(true, Ordering::SeqCst);
        repo
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_column(&self) -> RepositoryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_column.load(Ordering::SeqCst) {
            return Err(RepositoryError::MissingColumn(THEME_COLUMN.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get_theme(&self, session: &Session) -> RepositoryResult<Option<ThemePreference>> {
        self.check_column()?;
        Ok(self.themes.read().await.get(&session.user_id).copied())
    }

    async fn set_theme(&self, session: &Session, theme: ThemePreference) -> RepositoryResult<()> {
        self.check_column()?;
        self.themes
            .write()
            .await
            .insert(session.user_id.clone(), theme);
        Ok(())
    }
}
