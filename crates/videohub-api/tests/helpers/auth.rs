//! Access tokens signed the way Supabase signs them.

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

pub const TEST_JWT_SECRET: &str = "videohub-test-jwt-secret";
pub const TEST_USER_ID: &str = "test-user-id";
pub const TEST_USER_EMAIL: &str = "test@example.com";

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    email: &'a str,
    exp: i64,
    aud: &'a str,
}

pub fn mint_token(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id,
        email: TEST_USER_EMAIL,
        exp: chrono::Utc::now().timestamp() + 3600,
        aud: "authenticated",
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// `Authorization` header value for the default test user.
pub fn bearer() -> String {
    bearer_for(TEST_USER_ID)
}

pub fn bearer_for(user_id: &str) -> String {
    format!("Bearer {}", mint_token(user_id))
}
