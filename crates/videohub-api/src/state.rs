//! Application state shared by every handler.
//!
//! All clients are constructed once in `setup` and injected here; handlers reach
//! them through `State<Arc<AppState>>`.

use crate::auth::{AuthGate, SessionProvider};
use std::sync::Arc;
use videohub_db::ProfileRepository;
use videohub_infra::RateLimiter;
use videohub_storage::BucketRegistry;

#[derive(Clone)]
pub struct AppState {
    /// Resolves the current session from request headers.
    pub sessions: Arc<dyn SessionProvider>,
    pub buckets: BucketRegistry,
    pub profiles: Arc<dyn ProfileRepository>,
    /// `ratelimit:theme`
    pub theme_limiter: Arc<RateLimiter>,
    pub auth_gate: AuthGate,
}
