//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are unix seconds.

pub mod form;
pub mod permission;
pub mod role;
pub mod user;

// Re-exports
pub use form::*;
pub use permission::*;
pub use role::*;
pub use user::*;
