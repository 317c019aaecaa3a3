//! Session lookup through the Supabase Auth API.

use super::session::{extract_access_token, SessionProvider};
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;
use std::time::Duration;
use videohub_core::Session;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

/// Asks `{SUPABASE_URL}/auth/v1/user` who the bearer of a token is.
pub struct SupabaseSessionProvider {
    client: reqwest::Client,
    user_url: String,
    anon_key: String,
}

impl SupabaseSessionProvider {
    pub fn new(supabase_url: &str, anon_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }

    async fn lookup(&self, token: &str) -> Result<Option<Session>, reqwest::Error> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Auth API rejected access token");
            return Ok(None);
        }

        let user: AuthUser = response.json().await?;
        let session = Session::new(user.id, token);
        Ok(Some(match user.email {
            Some(email) => session.with_email(email),
            None => session,
        }))
    }
}

#[async_trait]
impl SessionProvider for SupabaseSessionProvider {
    async fn session(&self, headers: &HeaderMap) -> Option<Session> {
        let token = extract_access_token(headers)?;
        match self.lookup(&token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Auth API request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    async fn spawn_auth_api() -> String {
        let app = Router::new().route(
            "/auth/v1/user",
            get(|headers: HeaderMap| async move {
                let authorized = headers.get("apikey").is_some_and(|v| v == "anon")
                    && headers
                        .get(header::AUTHORIZATION)
                        .is_some_and(|v| v == "Bearer good-token");
                if authorized {
                    Ok(Json(serde_json::json!({
                        "id": "user-42",
                        "email": "user@example.com"
                    })))
                } else {
                    Err(StatusCode::UNAUTHORIZED)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_resolves_session() {
        let url = spawn_auth_api().await;
        let provider = SupabaseSessionProvider::new(&url, "anon").unwrap();

        let session = provider.session(&bearer("good-token")).await.unwrap();
        assert_eq!(session.user_id, "user-42");
        assert_eq!(session.email.as_deref(), Some("user@example.com"));
        assert_eq!(session.access_token, "good-token");
    }

    #[tokio::test]
    async fn test_rejected_token_has_no_session() {
        let url = spawn_auth_api().await;
        let provider = SupabaseSessionProvider::new(&url, "anon").unwrap();

        assert!(provider.session(&bearer("bad-token")).await.is_none());
        assert!(provider.session(&HeaderMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_auth_api_has_no_session() {
        let provider = SupabaseSessionProvider::new("http://127.0.0.1:1", "anon").unwrap();
        assert!(provider.session(&bearer("good-token")).await.is_none());
    }
}
