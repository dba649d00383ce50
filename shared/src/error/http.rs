//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code an error envelope is served with
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::ResourceNotExist => StatusCode::NOT_FOUND,

            Self::ResourceExists | Self::HasHandled | Self::RepeatedId => StatusCode::CONFLICT,

            Self::NotLogin | Self::WrongPassword => StatusCode::UNAUTHORIZED,

            Self::PermissionError | Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::RequestThrottled => StatusCode::TOO_MANY_REQUESTS,

            // transient, client can retry
            Self::NetworkError | Self::DbError => StatusCode::SERVICE_UNAVAILABLE,

            Self::NotDefined => StatusCode::INTERNAL_SERVER_ERROR,

            Self::InvalidParam | Self::InvalidPage | Self::EmptyContent => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_client_error_statuses() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::ResourceExists.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::NotLogin.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::InvalidParam.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::RequestThrottled.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_server_error_statuses() {
        assert_eq!(
            ErrorCode::NotDefined.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DbError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
