//! Data models for the application
//!
//! Wire types for uploads, theme preferences and the authenticated session.

mod session;
mod theme;
mod upload;

pub use session::*;
pub use theme::*;
pub use upload::*;
