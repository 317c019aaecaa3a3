//! Rate limit store abstraction

use super::RateLimitError;
use async_trait::async_trait;
use std::time::Duration;

/// Result of consuming one token from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDecision {
    pub success: bool,
    pub remaining: u32,
    /// End of the current fixed window, Unix epoch milliseconds.
    pub reset_ms: i64,
}

/// Backend holding sliding window counters.
///
/// Implementations split time into fixed windows and weight the previous
/// window's count by how much of it still overlaps the sliding window.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Try to consume one request for `key` against `tokens` per `window`.
    async fn limit(
        &self,
        key: &str,
        tokens: u32,
        window: Duration,
    ) -> Result<StoreDecision, RateLimitError>;

    fn name(&self) -> &'static str;
}

/// Index of the fixed window containing `now_ms`.
pub(crate) fn window_index(now_ms: i64, window_ms: i64) -> i64 {
    now_ms.div_euclid(window_ms)
}

/// Share of the previous window's count still inside the sliding window.
pub(crate) fn weighted_previous(previous: u64, now_ms: i64, window_ms: i64) -> u64 {
    let elapsed = now_ms.rem_euclid(window_ms) as f64 / window_ms as f64;
    ((1.0 - elapsed) * previous as f64).floor() as u64
}

pub(crate) fn window_millis(window: Duration) -> i64 {
    (window.as_millis() as i64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighting() {
        assert_eq!(weighted_previous(10, 60_000, 60_000), 10);
        assert_eq!(weighted_previous(10, 90_000, 60_000), 5);
        assert_eq!(weighted_previous(10, 119_999, 60_000), 0);
        assert_eq!(window_index(119_999, 60_000), 1);
    }
}
