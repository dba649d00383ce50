//! Application error type

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use crate::response::ApiResponse;
use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Application error with a stable code, a user-facing detail and optional
/// developer-facing field information
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct AppError {
    pub code: ErrorCode,
    /// Shown to the user
    pub detail: String,
    /// Shown to developers (validation errors, offending ids, ...)
    pub fields: Option<Vec<Value>>,
}

impl AppError {
    /// Create a new error with the default detail for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            detail: code.message().to_string(),
            code,
            fields: None,
        }
    }

    /// Create a new error with a custom detail
    pub fn with_message(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            fields: None,
        }
    }

    /// Append one entry to `fields`
    pub fn with_field(mut self, value: impl Into<Value>) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(value.into());
        self
    }

    /// Replace `fields` wholesale
    pub fn with_fields(mut self, fields: Vec<Value>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource.into()))
    }

    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidParam, msg)
    }

    pub fn invalid_page() -> Self {
        Self::new(ErrorCode::InvalidPage)
    }

    pub fn resource_exists(resource: impl Into<String>) -> Self {
        Self::with_message(
            ErrorCode::ResourceExists,
            format!("{} already exists", resource.into()),
        )
    }

    pub fn resource_not_exist(resource: impl Into<String>) -> Self {
        Self::with_message(
            ErrorCode::ResourceNotExist,
            format!("{} does not exist", resource.into()),
        )
    }

    pub fn empty_content() -> Self {
        Self::new(ErrorCode::EmptyContent)
    }

    pub fn not_login() -> Self {
        Self::new(ErrorCode::NotLogin)
    }

    pub fn wrong_password() -> Self {
        Self::new(ErrorCode::WrongPassword)
    }

    /// The caller is logged in but may not touch this particular resource
    pub fn permission_error() -> Self {
        Self::new(ErrorCode::PermissionError)
    }

    /// The caller lacks a named permission (or superuser)
    pub fn permission_denied() -> Self {
        Self::new(ErrorCode::PermissionDenied)
    }

    pub fn network_error() -> Self {
        Self::new(ErrorCode::NetworkError)
    }

    pub fn db_error() -> Self {
        Self::new(ErrorCode::DbError)
    }

    /// Generic failure; the real cause is never shown to the client
    pub fn not_defined() -> Self {
        Self::new(ErrorCode::NotDefined)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                detail = %self.detail,
                "System error occurred"
            );
        }

        let body = ApiResponse::<()>::error(&self);
        (status, Json(body)).into_response()
    }
}
