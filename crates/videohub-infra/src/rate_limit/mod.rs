//! Rate limiting
//!
//! Named limiters over a sliding window store. Each limiter carries an
//! explicit enforcement mode deciding what happens when the store is missing
//! or failing:
//!
//! - `BestEffort`: allow the request with a fixed generous quota and log it.
//! - `Strict`: refuse to construct without a store, deny when the store fails.
//!
//! # Headers
//! Every outcome carries:
//! - `X-RateLimit-Limit`: requests allowed per window
//! - `X-RateLimit-Remaining`: requests left in the sliding window
//! - `X-RateLimit-Reset`: end of the current window, Unix epoch milliseconds

mod identifier;
mod memory;
mod store;
mod upstash;

pub use identifier::client_identifier;
pub use memory::MemoryStore;
pub use store::{RateLimitStore, StoreDecision};
pub use upstash::UpstashStore;

use axum::http::{HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use videohub_core::constants::FAIL_OPEN_QUOTA;
use videohub_core::{AppError, Enforcement, RateLimitBackend, RateLimitSettings};

pub const LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RESET_HEADER: &str = "X-RateLimit-Reset";

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit configuration error: {0}")]
    Configuration(String),

    #[error("Rate limit store error: {0}")]
    Store(String),
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Configuration(msg) => AppError::Configuration(msg),
            RateLimitError::Store(msg) => AppError::Internal(msg),
        }
    }
}

/// Settings for one named limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub name: String,
    /// Prepended to identifiers to build store keys.
    pub prefix: String,
    pub limit: u32,
    pub window: Duration,
    pub enforcement: Enforcement,
}

impl RateLimitConfig {
    pub fn new(name: &str, limit: u32, window: Duration, enforcement: Enforcement) -> Self {
        Self {
            name: name.to_string(),
            prefix: format!("ratelimit:{}", name),
            limit,
            window,
            enforcement,
        }
    }

    /// Theme preference limiter, `ratelimit:theme`.
    pub fn theme(settings: &RateLimitSettings) -> Self {
        Self::new(
            "theme",
            settings.theme_per_minute,
            Duration::from_secs(settings.window_secs),
            settings.enforcement,
        )
    }
}

/// Decision for a single request.
#[derive(Debug, Clone)]
pub struct RateLimitOutcome {
    pub success: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix epoch milliseconds.
    pub reset: i64,
    pub headers: HeaderMap,
}

impl RateLimitOutcome {
    pub fn new(success: bool, limit: u32, remaining: u32, reset: i64) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (LIMIT_HEADER, limit.to_string()),
            (REMAINING_HEADER, remaining.to_string()),
            (RESET_HEADER, reset.to_string()),
        ] {
            if let Ok(header_value) = HeaderValue::from_str(&value) {
                headers.insert(name, header_value);
            }
        }

        Self {
            success,
            limit,
            remaining,
            reset,
            headers,
        }
    }

    /// `Ok` when allowed, otherwise the error rendered as a 429.
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.success {
            Ok(self)
        } else {
            Err(AppError::RateLimited {
                limit: self.limit,
                remaining: self.remaining,
                reset: self.reset,
            })
        }
    }
}

/// A named limiter bound to an optional store.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Option<Arc<dyn RateLimitStore>>,
}

impl RateLimiter {
    /// Fails for a strict limiter without a store.
    pub fn new(
        config: RateLimitConfig,
        store: Option<Arc<dyn RateLimitStore>>,
    ) -> Result<Self, RateLimitError> {
        match (&store, config.enforcement) {
            (None, Enforcement::Strict) => {
                return Err(RateLimitError::Configuration(format!(
                    "rate limiter '{}' is strict but no store is configured",
                    config.name
                )));
            }
            (None, Enforcement::BestEffort) => {
                tracing::warn!(
                    limiter = %config.name,
                    quota = FAIL_OPEN_QUOTA,
                    "No rate limit store configured; limiter is failing open"
                );
            }
            (Some(store), _) => {
                tracing::info!(
                    limiter = %config.name,
                    store = store.name(),
                    limit = config.limit,
                    window_secs = config.window.as_secs(),
                    "Rate limiter configured"
                );
            }
        }

        Ok(Self { config, store })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Consume one request for `identifier`.
    pub async fn check(&self, identifier: &str) -> RateLimitOutcome {
        let Some(store) = &self.store else {
            return self.fail_open();
        };

        let key = format!("{}:{}", self.config.prefix, identifier);
        match store
            .limit(&key, self.config.limit, self.config.window)
            .await
        {
            Ok(decision) => {
                if !decision.success {
                    tracing::warn!(
                        limiter = %self.config.name,
                        identifier = %identifier,
                        limit = self.config.limit,
                        "Rate limit exceeded"
                    );
                }
                RateLimitOutcome::new(
                    decision.success,
                    self.config.limit,
                    decision.remaining,
                    decision.reset_ms,
                )
            }
            Err(e) => match self.config.enforcement {
                Enforcement::BestEffort => {
                    tracing::warn!(
                        limiter = %self.config.name,
                        error = %e,
                        "Rate limit store failed; allowing request"
                    );
                    self.fail_open()
                }
                Enforcement::Strict => {
                    tracing::error!(
                        limiter = %self.config.name,
                        error = %e,
                        "Rate limit store failed; denying request"
                    );
                    RateLimitOutcome::new(false, self.config.limit, 0, self.window_end())
                }
            },
        }
    }

    fn fail_open(&self) -> RateLimitOutcome {
        RateLimitOutcome::new(true, FAIL_OPEN_QUOTA, FAIL_OPEN_QUOTA, self.window_end())
    }

    fn window_end(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() + self.config.window.as_millis() as i64
    }
}

/// Apply `limiter` to a request. The identifier defaults to the client IP
/// taken from forwarding headers.
pub async fn with_rate_limit(
    headers: &HeaderMap,
    limiter: &RateLimiter,
    identifier: Option<&str>,
) -> RateLimitOutcome {
    let identifier = identifier
        .map(str::to_string)
        .unwrap_or_else(|| client_identifier(headers));
    limiter.check(&identifier).await
}

/// Build the shared store selected by the settings, if any.
pub fn create_rate_limit_store(
    settings: &RateLimitSettings,
) -> Result<Option<Arc<dyn RateLimitStore>>, RateLimitError> {
    match settings.backend {
        Some(RateLimitBackend::Upstash) => {
            let (Some(url), Some(token)) = (&settings.upstash_url, &settings.upstash_token) else {
                return Err(RateLimitError::Configuration(
                    "UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN are required".to_string(),
                ));
            };
            Ok(Some(Arc::new(UpstashStore::new(url, token)?)))
        }
        Some(RateLimitBackend::Memory) => Ok(Some(Arc::new(MemoryStore::new()))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl RateLimitStore for FailingStore {
        async fn limit(
            &self,
            _key: &str,
            _tokens: u32,
            _window: Duration,
        ) -> Result<StoreDecision, RateLimitError> {
            Err(RateLimitError::Store("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn config(limit: u32, enforcement: Enforcement) -> RateLimitConfig {
        RateLimitConfig::new("test", limit, Duration::from_secs(60), enforcement)
    }

    #[tokio::test]
    async fn test_fail_open_without_store() {
        let limiter = RateLimiter::new(config(2, Enforcement::BestEffort), None).unwrap();
        let before = chrono::Utc::now().timestamp_millis();

        for _ in 0..5 {
            let outcome = with_rate_limit(&HeaderMap::new(), &limiter, None).await;
            assert!(outcome.success);
            assert_eq!(outcome.limit, 1000);
            assert_eq!(outcome.remaining, 1000);
            assert!(outcome.reset >= before + 60_000);
            assert_eq!(outcome.headers[LIMIT_HEADER], "1000");
        }
    }

    #[test]
    fn test_strict_requires_store() {
        let result = RateLimiter::new(config(2, Enforcement::Strict), None);
        assert!(matches!(result, Err(RateLimitError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_store_failure_depends_on_enforcement() {
        let lenient =
            RateLimiter::new(config(2, Enforcement::BestEffort), Some(Arc::new(FailingStore)))
                .unwrap();
        let outcome = lenient.check("user").await;
        assert!(outcome.success);
        assert_eq!(outcome.remaining, 1000);

        let strict =
            RateLimiter::new(config(2, Enforcement::Strict), Some(Arc::new(FailingStore)))
                .unwrap();
        let outcome = strict.check("user").await;
        assert!(!outcome.success);
        assert_eq!(outcome.remaining, 0);
        assert_eq!(outcome.limit, 2);
    }

    #[tokio::test]
    async fn test_memory_store_enforces_limit_per_identifier() {
        let limiter = RateLimiter::new(
            config(2, Enforcement::Strict),
            Some(Arc::new(MemoryStore::new())),
        )
        .unwrap();

        assert!(limiter.check("a").await.success);
        let second = limiter.check("a").await;
        assert!(second.success);
        assert_eq!(second.headers[REMAINING_HEADER], "0");

        let third = limiter.check("a").await;
        assert!(!third.success);
        assert!(matches!(
            third.into_result(),
            Err(AppError::RateLimited { limit: 2, remaining: 0, .. })
        ));

        assert!(limiter.check("b").await.success);
    }

    #[tokio::test]
    async fn test_explicit_identifier_overrides_ip() {
        let limiter = RateLimiter::new(
            config(1, Enforcement::BestEffort),
            Some(Arc::new(MemoryStore::new())),
        )
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));

        assert!(with_rate_limit(&headers, &limiter, None).await.success);
        assert!(!with_rate_limit(&headers, &limiter, None).await.success);
        assert!(with_rate_limit(&headers, &limiter, Some("user-1")).await.success);
    }

    #[test]
    fn test_theme_config() {
        let settings = RateLimitSettings {
            enforcement: Enforcement::BestEffort,
            backend: None,
            upstash_url: None,
            upstash_token: None,
            theme_per_minute: 30,
            window_secs: 60,
        };
        let config = RateLimitConfig::theme(&settings);
        assert_eq!(config.prefix, "ratelimit:theme");
        assert_eq!(config.limit, 30);
        assert_eq!(config.window, Duration::from_secs(60));
    }
}
