//! VideoHub database access
//!
//! Profile persistence behind the `ProfileRepository` trait, backed either by a
//! direct Postgres pool or by the Supabase PostgREST API.

pub mod db;

pub use db::*;
