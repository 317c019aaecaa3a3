use super::store::{window_index, window_millis, RateLimitStore, StoreDecision};
use super::RateLimitError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Two-bucket sliding window evaluated atomically in Redis.
///
/// KEYS: current window key, previous window key.
/// ARGV: tokens, now (ms), window (ms), increment.
/// Returns the remaining count, or -1 when the request is denied.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local current_key = KEYS[1]
local previous_key = KEYS[2]
local tokens = tonumber(ARGV[1])
local now = tonumber(ARGV[2])
local window = tonumber(ARGV[3])
local increment = tonumber(ARGV[4])

local current = tonumber(redis.call("GET", current_key) or "0")
local previous = tonumber(redis.call("GET", previous_key) or "0")
local elapsed = (now % window) / window
previous = math.floor((1 - elapsed) * previous)

if previous + current >= tokens then
  return -1
end

local value = redis.call("INCRBY", current_key, increment)
if value == increment then
  redis.call("PEXPIRE", current_key, window * 2 + 1000)
end
return tokens - (value + previous)
"#;

/// Rate limit store backed by the Upstash Redis REST API.
#[derive(Clone)]
pub struct UpstashStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Deserialize)]
struct UpstashResponse {
    result: Option<serde_json::Value>,
    error: Option<String>,
}

impl UpstashStore {
    pub fn new(url: &str, token: &str) -> Result<Self, RateLimitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RateLimitError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn eval(&self, keys: [String; 2], args: [String; 4]) -> Result<i64, RateLimitError> {
        let mut command = vec![
            "EVAL".to_string(),
            SLIDING_WINDOW_SCRIPT.to_string(),
            keys.len().to_string(),
        ];
        command.extend(keys);
        command.extend(args);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| RateLimitError::Store(format!("Upstash request failed: {}", e)))?;

        let status = response.status();
        let body: UpstashResponse = response.json().await.map_err(|e| {
            RateLimitError::Store(format!("Invalid Upstash response ({}): {}", status, e))
        })?;

        if let Some(error) = body.error {
            return Err(RateLimitError::Store(format!("Upstash error: {}", error)));
        }
        if !status.is_success() {
            return Err(RateLimitError::Store(format!(
                "Upstash returned status {}",
                status
            )));
        }

        body.result
            .as_ref()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| RateLimitError::Store("Upstash returned a non-integer result".to_string()))
    }
}

#[async_trait]
impl RateLimitStore for UpstashStore {
    async fn limit(
        &self,
        key: &str,
        tokens: u32,
        window: Duration,
    ) -> Result<StoreDecision, RateLimitError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = window_millis(window);
        let current_window = window_index(now_ms, window_ms);
        let reset_ms = (current_window + 1) * window_ms;

        let remaining = self
            .eval(
                [
                    format!("{}:{}", key, current_window),
                    format!("{}:{}", key, current_window - 1),
                ],
                [
                    tokens.to_string(),
                    now_ms.to_string(),
                    window_ms.to_string(),
                    "1".to_string(),
                ],
            )
            .await?;

        Ok(StoreDecision {
            success: remaining >= 0,
            remaining: u32::try_from(remaining.max(0)).unwrap_or(u32::MAX),
            reset_ms,
        })
    }

    fn name(&self) -> &'static str {
        "upstash"
    }
}
