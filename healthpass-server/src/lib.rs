//! healthpass server
//!
//! User accounts, a role tree with ancestry-based management rights,
//! permissions and health declaration forms over SQLite.
//!
//! # Module structure
//!
//! ```text
//! healthpass-server/src/
//! ├── core/      # config, state, HTTP server
//! ├── auth/      # tokens, passwords, guards, authorization predicates
//! ├── api/       # routes and handlers
//! ├── db/        # pool, schema, pagination, repositories
//! ├── alert/     # outbound alerts for unexpected failures
//! └── utils/     # errors, logging, validation
//! ```

pub mod alert;
pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

pub use api::build_app;
pub use auth::{CurrentUser, JwtService};
pub use core::{AppState, Config, Server};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Structured log line on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
