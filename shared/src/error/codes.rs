//! Error codes carried in the `code` field of every response envelope
//!
//! Codes are grouped by range:
//! - 200: success
//! - 100xxx: general request errors
//! - 101xxx: authentication and authorization errors
//! - 109xxx: system errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope error code
///
/// Serialized as a bare integer so clients can switch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
pub enum ErrorCode {
    /// Request handled
    Success = 200,

    // ==================== 100xxx: General ====================
    /// Page or resource not found
    NotFound = 100001,
    /// Missing or malformed parameter
    InvalidParam = 100002,
    /// Resource already exists
    ResourceExists = 100003,
    /// Referenced resource does not exist
    ResourceNotExist = 100004,
    /// Nothing to operate on
    EmptyContent = 100005,
    /// Already handled
    HasHandled = 100006,
    /// Duplicated identifier
    RepeatedId = 100007,
    /// Page number or page size out of range
    InvalidPage = 100008,

    // ==================== 101xxx: Auth ====================
    /// No valid login token
    NotLogin = 101001,
    /// Password mismatch
    WrongPassword = 101002,
    /// Caller may not touch this resource
    PermissionError = 101003,
    /// Caller lacks a required permission
    PermissionDenied = 101004,
    /// Too many requests
    RequestThrottled = 101005,

    // ==================== 109xxx: System ====================
    /// Unexpected failure; details go to the alert sink
    NotDefined = 109000,
    /// Outbound network call failed
    NetworkError = 109001,
    /// Storage unavailable
    DbError = 109002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u32 {
        *self as u32
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default user-facing detail for this code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "success",

            ErrorCode::NotFound => "not found",
            ErrorCode::InvalidParam => "invalid or missing parameter",
            ErrorCode::ResourceExists => "resource already exists",
            ErrorCode::ResourceNotExist => "resource does not exist",
            ErrorCode::EmptyContent => "content is empty",
            ErrorCode::HasHandled => "already handled",
            ErrorCode::RepeatedId => "repeated id",
            ErrorCode::InvalidPage => "invalid page",

            ErrorCode::NotLogin => "please login first",
            ErrorCode::WrongPassword => "wrong password",
            ErrorCode::PermissionError => "no permission for this resource",
            ErrorCode::PermissionDenied => "permission denied",
            ErrorCode::RequestThrottled => "too many requests, try again later",

            ErrorCode::NotDefined => "service error, please contact us",
            ErrorCode::NetworkError => "network error",
            ErrorCode::DbError => "database error",
        }
    }
}

impl From<ErrorCode> for u32 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an unknown integer to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u32);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u32> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(ErrorCode::Success),

            100001 => Ok(ErrorCode::NotFound),
            100002 => Ok(ErrorCode::InvalidParam),
            100003 => Ok(ErrorCode::ResourceExists),
            100004 => Ok(ErrorCode::ResourceNotExist),
            100005 => Ok(ErrorCode::EmptyContent),
            100006 => Ok(ErrorCode::HasHandled),
            100007 => Ok(ErrorCode::RepeatedId),
            100008 => Ok(ErrorCode::InvalidPage),

            101001 => Ok(ErrorCode::NotLogin),
            101002 => Ok(ErrorCode::WrongPassword),
            101003 => Ok(ErrorCode::PermissionError),
            101004 => Ok(ErrorCode::PermissionDenied),
            101005 => Ok(ErrorCode::RequestThrottled),

            109000 => Ok(ErrorCode::NotDefined),
            109001 => Ok(ErrorCode::NetworkError),
            109002 => Ok(ErrorCode::DbError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 200);
        assert_eq!(ErrorCode::NotFound.code(), 100001);
        assert_eq!(ErrorCode::InvalidParam.code(), 100002);
        assert_eq!(ErrorCode::InvalidPage.code(), 100008);
        assert_eq!(ErrorCode::NotLogin.code(), 101001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 101004);
        assert_eq!(ErrorCode::NotDefined.code(), 109000);
        assert_eq!(ErrorCode::DbError.code(), 109002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::NotDefined.is_success());
    }

    #[test]
    fn test_try_from() {
        assert_eq!(ErrorCode::try_from(200), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(101003), Ok(ErrorCode::PermissionError));
        assert_eq!(ErrorCode::try_from(109001), Ok(ErrorCode::NetworkError));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(100999), Err(InvalidErrorCode(100999)));
    }

    #[test]
    fn test_serialize_as_integer() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "200");
        assert_eq!(
            serde_json::to_string(&ErrorCode::ResourceExists).unwrap(),
            "100003"
        );

        let code: ErrorCode = serde_json::from_str("101002").unwrap();
        assert_eq!(code, ErrorCode::WrongPassword);
        assert!(serde_json::from_str::<ErrorCode>("404").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "100001");
        assert_eq!(
            format!("{}", InvalidErrorCode(7)),
            "invalid error code: 7"
        );
    }

    #[test]
    fn test_not_defined_message_is_generic() {
        assert_eq!(
            ErrorCode::NotDefined.message(),
            "service error, please contact us"
        );
    }
}
