//! Utility module
//!
//! - [`ServiceError`] / [`ServiceResult`]: handler error type
//! - logging setup and input validation

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{ServiceError, ServiceResult, Unexpected};
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use shared::response::{ApiResponse, PageLinks};
