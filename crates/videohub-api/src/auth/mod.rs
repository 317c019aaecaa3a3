//! Session resolution and the page auth gate.

pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod session;
pub mod supabase;

pub use gate::{AuthGate, GateDecision};
pub use jwt::JwtSessionProvider;
pub use middleware::{auth_gate_middleware, AuthSession};
pub use session::{extract_access_token, SessionProvider};
pub use supabase::SupabaseSessionProvider;
