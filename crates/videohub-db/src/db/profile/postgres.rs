use super::{parse_stored_theme, ProfileRepository, RepositoryResult};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use videohub_core::{Session, ThemePreference};

/// Repository for profiles over a direct Postgres connection
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[tracing::instrument(skip(self, session), fields(db.table = "profiles", db.operation = "select", user_id = %session.user_id))]
    async fn get_theme(&self, session: &Session) -> RepositoryResult<Option<ThemePreference>> {
        let stored = sqlx::query_scalar::<Postgres, Option<String>>(
            "SELECT theme_preference FROM profiles WHERE id::text = $1",
        )
        .bind(&session.user_id)
        .fetch_optional(&self.pool)
        .await?
        .flatten();

        Ok(parse_stored_theme(&session.user_id, stored))
    }

    #[tracing::instrument(skip(self, session), fields(db.table = "profiles", db.operation = "update", user_id = %session.user_id))]
    async fn set_theme(&self, session: &Session, theme: ThemePreference) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE profiles SET theme_preference = $2 WHERE id::text = $1")
            .bind(&session.user_id)
            .bind(theme.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(user_id = %session.user_id, "No profile row to update");
        }

        Ok(())
    }
}
