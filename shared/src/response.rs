//! API Response types
//!
//! Every endpoint answers with the same envelope:
//! ```json
//! {
//!     "code": 200,
//!     "detail": null,
//!     "fields": null,
//!     "success": true,
//!     "data": { ... }
//! }
//! ```
//! Paginated endpoints merge `next`, `previous` and `count` into the top level.

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Navigation block merged into paginated envelopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
    pub count: u64,
}

impl PageLinks {
    /// Links for a result set with no rows
    pub fn empty() -> Self {
        Self {
            next: None,
            previous: None,
            count: 0,
        }
    }
}

/// Unified response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    /// User-facing message, null on success
    pub detail: Option<String>,
    /// Developer-facing details, null unless the error carries some
    pub fields: Option<Vec<Value>>,
    pub success: bool,
    /// Payload, null on failure
    pub data: Option<T>,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageLinks>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            detail: None,
            fields: None,
            success: true,
            data: Some(data),
            page: None,
        }
    }

    /// Create a paginated success response
    pub fn paginated(data: T, page: PageLinks) -> Self {
        Self {
            page: Some(page),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// Success without payload; `data` serializes as null
    pub fn ok() -> Self {
        Self {
            code: ErrorCode::Success.code(),
            detail: None,
            fields: None,
            success: true,
            data: None,
            page: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            detail: Some(err.detail.clone()),
            fields: err.fields.clone(),
            success: false,
            data: None,
            page: None,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = ErrorCode::try_from(self.code)
            .map(|c| c.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}
