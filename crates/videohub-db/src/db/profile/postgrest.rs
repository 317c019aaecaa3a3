use super::{
    is_missing_column_code, parse_stored_theme, ProfileRepository, RepositoryError,
    RepositoryResult, PROFILES_TABLE, THEME_COLUMN,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use videohub_core::{Session, ThemePreference};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Repository for profiles through the Supabase REST API (PostgREST).
///
/// Requests carry the caller's access token so row level security applies.
#[derive(Clone)]
pub struct PostgrestProfileRepository {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct ProfileRow {
    theme_preference: Option<String>,
}

#[derive(Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl PostgrestProfileRepository {
    pub fn new(supabase_url: &str, anon_key: &str) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(Self {
            client,
            base_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, PROFILES_TABLE)
    }

    fn request(&self, method: reqwest::Method, session: &Session) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .query(&[("id", format!("eq.{}", session.user_id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn error_from_response(response: reqwest::Response) -> RepositoryError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err) if err.code.as_deref().is_some_and(is_missing_column_code) => {
                RepositoryError::MissingColumn(THEME_COLUMN.to_string())
            }
            Ok(err) => RepositoryError::Upstream {
                status,
                message: err.message.unwrap_or(body),
            },
            Err(_) => RepositoryError::Upstream {
                status,
                message: body,
            },
        }
    }
}

fn transport_error(err: reqwest::Error) -> RepositoryError {
    RepositoryError::Database(format!("PostgREST request failed: {}", err))
}

#[async_trait]
impl ProfileRepository for PostgrestProfileRepository {
    #[tracing::instrument(skip(self, session), fields(db.table = "profiles", db.operation = "select", user_id = %session.user_id))]
    async fn get_theme(&self, session: &Session) -> RepositoryResult<Option<ThemePreference>> {
        let response = self
            .request(reqwest::Method::GET, session)
            .query(&[("select", THEME_COLUMN)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let rows: Vec<ProfileRow> = response.json().await.map_err(transport_error)?;
        let stored = rows.into_iter().next().and_then(|row| row.theme_preference);
        Ok(parse_stored_theme(&session.user_id, stored))
    }

    #[tracing::instrument(skip(self, session), fields(db.table = "profiles", db.operation = "update", user_id = %session.user_id))]
    async fn set_theme(&self, session: &Session, theme: ThemePreference) -> RepositoryResult<()> {
        let response = self
            .request(reqwest::Method::PATCH, session)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ THEME_COLUMN: theme.as_str() }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }
}
