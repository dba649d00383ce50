//! Shared types for healthpass
//!
//! Error codes, the response envelope, data models and constants used by the
//! server and by anything that talks to it.

pub mod constants;
pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
