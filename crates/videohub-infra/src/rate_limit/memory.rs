use super::store::{weighted_previous, window_index, window_millis, RateLimitStore, StoreDecision};
use super::RateLimitError;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const DEFAULT_SHARDS: usize = 16;
const MAX_ENTRIES_PER_SHARD: usize = 10_000;

/// Counts for the current and previous fixed window of one key.
#[derive(Clone, Copy, Debug)]
struct WindowCounter {
    window: i64,
    current: u64,
    previous: u64,
}

impl WindowCounter {
    fn roll_to(&mut self, window: i64) {
        if self.window == window {
            return;
        }
        self.previous = if self.window == window - 1 {
            self.current
        } else {
            0
        };
        self.current = 0;
        self.window = window;
    }
}

/// In-process sliding window store.
///
/// Uses multiple shards (separate HashMaps) to reduce contention on a single
/// mutex. Counters are lost on restart and not shared between instances.
#[derive(Clone)]
pub struct MemoryStore {
    shards: Vec<Arc<Mutex<HashMap<String, WindowCounter>>>>,
    max_entries: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            max_entries: MAX_ENTRIES_PER_SHARD,
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Consume one request for `key` at the given instant.
    pub(crate) async fn limit_at(
        &self,
        key: &str,
        tokens: u32,
        window: Duration,
        now_ms: i64,
    ) -> StoreDecision {
        let window_ms = window_millis(window);
        let current_window = window_index(now_ms, window_ms);
        let reset_ms = (current_window + 1) * window_ms;

        let shard_index = self.shard_index(key);
        let mut counters = self.shards[shard_index].lock().await;

        if counters.len() >= self.max_entries && !counters.contains_key(key) {
            // Entries older than the previous window no longer affect any decision.
            counters.retain(|_, counter| counter.window >= current_window - 1);
            if counters.len() >= self.max_entries {
                let oldest_key = counters
                    .iter()
                    .min_by_key(|(_, counter)| counter.window)
                    .map(|(k, _)| k.clone());
                if let Some(key_to_remove) = oldest_key {
                    counters.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        shard_index,
                        "Evicted oldest rate limit counter due to capacity limit"
                    );
                }
            }
        }

        let counter = counters
            .entry(key.to_string())
            .or_insert(WindowCounter {
                window: current_window,
                current: 0,
                previous: 0,
            });
        counter.roll_to(current_window);

        let previous = weighted_previous(counter.previous, now_ms, window_ms);
        let tokens = u64::from(tokens);
        if previous + counter.current >= tokens {
            return StoreDecision {
                success: false,
                remaining: 0,
                reset_ms,
            };
        }

        counter.current += 1;
        let remaining = tokens.saturating_sub(previous + counter.current);
        StoreDecision {
            success: true,
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            reset_ms,
        }
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn limit(
        &self,
        key: &str,
        tokens: u32,
        window: Duration,
    ) -> Result<StoreDecision, RateLimitError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        Ok(self.limit_at(key, tokens, window, now_ms).await)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_allows_up_to_limit_then_denies() {
        let store = MemoryStore::new();
        let now = 1_700_000_000_000 - (1_700_000_000_000 % 60_000);

        for expected_remaining in (0..3).rev() {
            let decision = store.limit_at("k", 3, WINDOW, now).await;
            assert!(decision.success);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = store.limit_at("k", 3, WINDOW, now + 10).await;
        assert!(!denied.success);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_ms, now + 60_000);
    }

    #[tokio::test]
    async fn test_previous_window_is_weighted() {
        let store = MemoryStore::new();
        let start = 60_000 * 1000;

        for _ in 0..4 {
            assert!(store.limit_at("k", 4, WINDOW, start).await.success);
        }

        // Half way through the next window half of the previous count still applies.
        let decision = store.limit_at("k", 4, WINDOW, start + 90_000).await;
        assert!(decision.success);
        assert_eq!(decision.remaining, 1);
        assert!(store.limit_at("k", 4, WINDOW, start + 90_000).await.success);
        assert!(!store.limit_at("k", 4, WINDOW, start + 90_000).await.success);

        // Two windows later the old counts are gone entirely.
        let decision = store.limit_at("k", 4, WINDOW, start + 240_000).await;
        assert_eq!(decision.remaining, 3);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryStore::with_shards(2);
        let now = 0;
        assert!(store.limit_at("a", 1, WINDOW, now).await.success);
        assert!(!store.limit_at("a", 1, WINDOW, now).await.success);
        assert!(store.limit_at("b", 1, WINDOW, now).await.success);
    }
}
