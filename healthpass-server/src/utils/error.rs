//! Unified service-layer error type
//!
//! `ServiceError` bridges storage errors (`sqlx::Error`, [`RepoError`]) and the
//! API-layer error (`AppError`) so handlers can use `?` everywhere.
//!
//! - `App`: a classified error, sent to the client as-is
//! - `Unexpected`: anything else; the client only sees `NotDefined` and an
//!   [`AlertReport`] rides on the response for the alert middleware

use std::backtrace::Backtrace;

use axum::response::IntoResponse;
use shared::error::AppError;

use crate::alert::AlertReport;
use crate::db::repository::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error nobody classified, with where it came from
#[derive(Debug)]
pub struct Unexpected {
    pub type_name: &'static str,
    pub error: BoxError,
    pub backtrace: Backtrace,
}

#[derive(Debug)]
pub enum ServiceError {
    App(AppError),
    Unexpected(Unexpected),
}

impl ServiceError {
    pub fn unexpected<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ServiceError::Unexpected(Unexpected {
            type_name: std::any::type_name::<E>(),
            error: Box::new(error),
            backtrace: Backtrace::force_capture(),
        })
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::App(e) => write!(f, "{} ({})", e.detail, e.code),
            ServiceError::Unexpected(u) => write!(f, "{}: {}", u.type_name, u.error),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                tracing::error!(error = %e, "Database pool unavailable");
                ServiceError::App(AppError::db_error())
            }
            other => ServiceError::unexpected(other),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(what) => AppError::not_found(what).into(),
            RepoError::Duplicate(what) => AppError::resource_exists(what).into(),
            RepoError::Validation(msg) => AppError::invalid_param(msg).into(),
            RepoError::Business(code, msg) => AppError::with_message(code, msg).into(),
            RepoError::Database(db) => db.into(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServiceError::App(app_error) => app_error.into_response(),
            ServiceError::Unexpected(u) => {
                tracing::error!(error = %u.error, kind = u.type_name, "Unexpected error");
                let report = AlertReport::for_unexpected(&u);
                let mut response = AppError::not_defined().into_response();
                response.extensions_mut().insert(report);
                response
            }
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
