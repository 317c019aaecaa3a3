//! Local verification of Supabase access tokens (HS256).

use super::session::{extract_access_token, SessionProvider};
use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use videohub_core::Session;

const SUPABASE_AUDIENCE: &str = "authenticated";

/// Claims carried by a Supabase access token that we rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub aud: String,
}

/// Verifies access tokens with the project's JWT secret, no network round trip.
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Option<Session> {
        match decode::<SupabaseClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => {
                let session = Session::new(data.claims.sub, token);
                Some(match data.claims.email {
                    Some(email) => session.with_email(email),
                    None => session,
                })
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn session(&self, headers: &HeaderMap) -> Option<Session> {
        let token = extract_access_token(headers)?;
        self.verify(&token)
    }
}
