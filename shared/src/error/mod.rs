//! Unified error system
//!
//! - [`ErrorCode`]: stable numeric codes carried in every response envelope
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: code + user-facing detail + optional developer `fields`
//!
//! # Error Code Ranges
//!
//! - 200: success
//! - 100xxx: general errors
//! - 101xxx: authentication / authorization errors
//! - 109xxx: system errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//! use shared::response::ApiResponse;
//!
//! let err = AppError::invalid_param("phone is invalid").with_field("phone");
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, ErrorCode::InvalidParam.code());
//! assert!(!body.success);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
