mod helpers;

use helpers::auth::{bearer, TEST_USER_ID};
use helpers::{setup_test_app, TestAppBuilder, IMAGES_PUBLIC_URL, VIDEOS_PUBLIC_URL};
use serde_json::{json, Value};

const PRESIGNED_URL: &str = "/api/upload/presigned-url";

#[tokio::test]
async fn test_presigned_url_for_video() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({
            "fileName": "test-video.mp4",
            "fileType": "video/mp4",
            "bucketType": "videos"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let key = body["key"].as_str().unwrap();
    let public_url = body["publicUrl"].as_str().unwrap();
    let presigned_url = body["presignedUrl"].as_str().unwrap();

    assert!(key.starts_with(&format!("videos/{}/", TEST_USER_ID)));
    assert!(key.ends_with(".mp4"));
    assert!(public_url.contains("videos/test-user-id/"));
    assert!(public_url.ends_with(".mp4"));
    assert_eq!(public_url, format!("{}/{}", VIDEOS_PUBLIC_URL, key));
    assert!(presigned_url.contains(key));

    let requests = app.videos.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].storage_key, key);
    assert_eq!(requests[0].content_type, "video/mp4");
    assert_eq!(requests[0].expires_in.as_secs(), 300);
}

#[tokio::test]
async fn test_bucket_type_defaults_to_videos() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({ "fileName": "clip.webm", "fileType": "video/webm" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["key"].as_str().unwrap().starts_with("videos/"));
    assert_eq!(app.videos.request_count(), 1);
    assert_eq!(app.images.request_count(), 0);
}

#[tokio::test]
async fn test_presigned_url_for_image() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({
            "fileName": "thumb.PNG",
            "fileType": "image/png",
            "bucketType": "images"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["key"].as_str().unwrap().ends_with(".png"));
    assert!(body["publicUrl"]
        .as_str()
        .unwrap()
        .starts_with(IMAGES_PUBLIC_URL));
}

#[tokio::test]
async fn test_disallowed_file_type_is_rejected() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({
            "fileName": "notes.pdf",
            "fileType": "application/pdf",
            "bucketType": "videos"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let details = body["details"].as_array().unwrap();
    assert!(!details.is_empty());
    assert_eq!(details[0]["field"], "fileType");
    assert_eq!(app.storage_calls(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_itemized() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({ "bucketType": "audio" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"fileName"));
    assert!(fields.contains(&"bucketType"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .add_header("Content-Type", "application/json")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(app.storage_calls(), 0);
}

#[tokio::test]
async fn test_no_session_is_unauthorized_without_storage_calls() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .json(&json!({
            "fileName": "test-video.mp4",
            "fileType": "video/mp4",
            "bucketType": "videos"
        }))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["path"], PRESIGNED_URL);
    assert!(body["requestId"].is_string());
    assert_eq!(app.storage_calls(), 0);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", "Bearer forged.token.value")
        .json(&json!({ "fileName": "a.mp4", "fileType": "video/mp4" }))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(app.storage_calls(), 0);
}

#[tokio::test]
async fn test_unconfigured_bucket_is_configuration_error() {
    let app = TestAppBuilder::default().without_images_bucket().build();

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({
            "fileName": "photo.jpg",
            "fileType": "image/jpeg",
            "bucketType": "images"
        }))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Server configuration error");
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_signing_failure_is_generic_server_error() {
    let app = setup_test_app();
    app.videos.fail_signing(true);

    let response = app
        .client()
        .post(PRESIGNED_URL)
        .add_header("Authorization", bearer())
        .json(&json!({ "fileName": "a.mp4", "fileType": "video/mp4" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to generate upload URL");
    assert_eq!(body["code"], "STORAGE_ERROR");
}
