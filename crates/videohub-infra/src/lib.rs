//! VideoHub Infrastructure Library
//!
//! Shared infrastructure components used by the HTTP service:
//! - Middleware (request ID and request context)
//! - Telemetry initialization
//! - Rate limiting (sliding window, Upstash or in-memory store)

pub mod middleware;
pub mod rate_limit;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{
    current_request_context, get_request_id, request_id_middleware, RequestContext, RequestId,
};
pub use rate_limit::{
    client_identifier, create_rate_limit_store, with_rate_limit, MemoryStore, RateLimitConfig,
    RateLimitError, RateLimitOutcome, RateLimitStore, RateLimiter, StoreDecision, UpstashStore,
};
pub use telemetry::{init_telemetry, shutdown_telemetry};
