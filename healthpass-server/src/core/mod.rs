//! Core module: configuration, shared state, HTTP server
//!
//! - [`Config`]: environment-driven configuration
//! - [`AppState`]: pool, token codec, alert sink, rate limiter
//! - [`Server`]: binds and serves the API

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError};
pub use server::Server;
pub use state::AppState;
