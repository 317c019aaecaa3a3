//! VideoHub API Library
//!
//! This crate provides the HTTP handlers, auth gate, error envelope and
//! application setup for the VideoHub backend.

pub mod auth;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
