mod helpers;

use helpers::auth::{bearer, bearer_for};
use helpers::{setup_test_app, TestAppBuilder};
use serde_json::{json, Value};

const THEME: &str = "/api/user/theme";

#[tokio::test]
async fn test_get_theme_defaults_to_system() {
    let app = setup_test_app();

    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({ "theme": "system" }));
    assert_eq!(response.header("X-RateLimit-Limit"), "30");
    assert_eq!(response.header("X-RateLimit-Remaining"), "29");
}

#[tokio::test]
async fn test_update_then_read_theme() {
    let app = setup_test_app();

    let response = app
        .client()
        .put(THEME)
        .add_header("Authorization", bearer())
        .json(&json!({ "theme": "dark" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true, "theme": "dark" }));

    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer())
        .await;
    let body: Value = response.json();
    assert_eq!(body["theme"], "dark");

    // Preferences are per user
    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer_for("someone-else"))
        .await;
    let body: Value = response.json();
    assert_eq!(body["theme"], "system");
}

#[tokio::test]
async fn test_invalid_theme_is_rejected() {
    let app = setup_test_app();

    for payload in [json!({ "theme": "purple" }), json!({ "theme": 3 }), json!({})] {
        let response = app
            .client()
            .put(THEME)
            .add_header("Authorization", bearer())
            .json(&payload)
            .await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid theme preference");
    }
}

#[tokio::test]
async fn test_no_session_is_unauthorized_without_db_calls() {
    let app = setup_test_app();

    let response = app.client().get(THEME).await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .client()
        .put(THEME)
        .json(&json!({ "theme": "light" }))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");

    assert_eq!(app.profiles.call_count(), 0);
}

#[tokio::test]
async fn test_missing_column_degrades() {
    let app = TestAppBuilder::default().without_theme_column().build();

    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer())
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["theme"], "system");

    let response = app
        .client()
        .put(THEME)
        .add_header("Authorization", bearer())
        .json(&json!({ "theme": "light" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["theme"], "light");
    assert_eq!(body["persisted"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_theme_is_rate_limited_per_user() {
    let app = TestAppBuilder::default().theme_limit(2).build();

    for _ in 0..2 {
        let response = app
            .client()
            .get(THEME)
            .add_header("Authorization", bearer())
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer())
        .await;
    assert_eq!(response.status_code(), 429);
    let body: Value = response.json();
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(response.header("X-RateLimit-Limit"), "2");
    assert_eq!(response.header("X-RateLimit-Remaining"), "0");
    let retry_after: u64 = response
        .header("Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // Another user has their own budget
    let response = app
        .client()
        .get(THEME)
        .add_header("Authorization", bearer_for("another-user"))
        .await;
    assert_eq!(response.status_code(), 200);
}
