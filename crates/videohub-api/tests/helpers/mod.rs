//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: sessions are verified with a known JWT secret,
//! storage and profiles are in memory, and the limiter uses the in-memory store.
//!
//! Run from workspace root: `cargo test -p videohub-api`.

#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use videohub_api::auth::{AuthGate, JwtSessionProvider};
use videohub_api::setup::routes;
use videohub_api::AppState;
use videohub_core::{BucketType, Config, Enforcement};
use videohub_db::InMemoryProfileRepository;
use videohub_infra::{MemoryStore, RateLimitConfig, RateLimiter};
use videohub_storage::{BucketRegistry, BucketTarget, MemoryStorage};

pub const VIDEOS_PUBLIC_URL: &str = "https://videos.cdn.test";
pub const IMAGES_PUBLIC_URL: &str = "https://images.cdn.test";

/// Test application and handles on its in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<MemoryStorage>,
    pub images: Arc<MemoryStorage>,
    pub profiles: Arc<InMemoryProfileRepository>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_calls(&self) -> usize {
        self.videos.request_count() + self.images.request_count()
    }
}

pub struct TestAppBuilder {
    profiles: InMemoryProfileRepository,
    theme_limit: u32,
    with_images: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            profiles: InMemoryProfileRepository::new(),
            theme_limit: 30,
            with_images: true,
        }
    }
}

impl TestAppBuilder {
    pub fn without_theme_column(mut self) -> Self {
        self.profiles = InMemoryProfileRepository::without_theme_column();
        self
    }

    pub fn theme_limit(mut self, limit: u32) -> Self {
        self.theme_limit = limit;
        self
    }

    pub fn without_images_bucket(mut self) -> Self {
        self.with_images = false;
        self
    }

    pub fn build(self) -> TestApp {
        let config = test_config();

        let videos = Arc::new(MemoryStorage::new("videos", "https://r2.test"));
        let images = Arc::new(MemoryStorage::new("images", "https://r2.test"));
        let mut buckets = BucketRegistry::new().with_bucket(
            BucketType::Videos,
            BucketTarget::new(videos.clone(), VIDEOS_PUBLIC_URL),
        );
        if self.with_images {
            buckets = buckets.with_bucket(
                BucketType::Images,
                BucketTarget::new(images.clone(), IMAGES_PUBLIC_URL),
            );
        }

        let theme_limiter = RateLimiter::new(
            RateLimitConfig::new(
                "theme",
                self.theme_limit,
                Duration::from_secs(60),
                Enforcement::Strict,
            ),
            Some(Arc::new(MemoryStore::new())),
        )
        .expect("Failed to create theme limiter");

        let profiles = Arc::new(self.profiles);
        let state = Arc::new(AppState {
            sessions: Arc::new(JwtSessionProvider::new(auth::TEST_JWT_SECRET)),
            buckets,
            profiles: profiles.clone(),
            theme_limiter: Arc::new(theme_limiter),
            auth_gate: AuthGate::from_settings(&config.auth_gate),
        });

        let router = routes::setup_routes(&config, state).expect("Failed to build routes");
        let server = TestServer::new(router).expect("Failed to create test server");

        TestApp {
            server,
            videos,
            images,
            profiles,
        }
    }
}

/// Default test application.
pub fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build()
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ENVIRONMENT", "test"),
        ("SUPABASE_JWT_SECRET", auth::TEST_JWT_SECRET),
        ("RATE_LIMIT_BACKEND", "memory"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("Failed to load test config")
}
