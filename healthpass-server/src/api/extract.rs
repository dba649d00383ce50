//! Request extractors answering with `InvalidParam` envelopes
//!
//! The rejection text reaches `fields` only outside production.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::Json;
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shared::error::AppError;

use crate::core::AppState;

/// Largest accepted `page_size`
pub const MAX_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest accepted `page_id`; keeps the row offset within `i64`
pub const MAX_PAGE_ID: i64 = i64::MAX / MAX_PAGE_SIZE;

fn invalid(state: &AppState, what: &str, detail: String) -> AppError {
    let err = AppError::invalid_param(format!("invalid {what}"));
    if state.config.is_production() {
        err
    } else {
        err.with_field(detail)
    }
}

/// `Json<T>` with an envelope rejection
pub struct ValidJson<T>(pub T);

impl<T> FromRequest<AppState> for ValidJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(invalid(state, "request body", rejection.body_text()))
            }
        }
    }
}

/// `Query<T>` with an envelope rejection
pub struct ValidQuery<T>(pub T);

impl<T> FromRequestParts<AppState> for ValidQuery<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidQuery(value)),
            Err(rejection) => {
                Err(invalid(state, "query parameters", rejection.body_text()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPage {
    page_id: Option<i64>,
    page_size: Option<i64>,
}

/// `page_id` (default 1, at least 1) and `page_size` (default 20, 1..=50)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page_id: i64,
    pub page_size: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_id: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    pub fn new(page_id: Option<i64>, page_size: Option<i64>) -> Result<Self, AppError> {
        let params = Self {
            page_id: page_id.unwrap_or(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if !(1..=MAX_PAGE_ID).contains(&params.page_id) {
            return Err(AppError::invalid_param(format!(
                "page_id must be between 1 and {MAX_PAGE_ID}"
            ))
            .with_field("page_id"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&params.page_size) {
            return Err(AppError::invalid_param(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            ))
            .with_field("page_size"));
        }
        Ok(params)
    }
}

impl FromRequestParts<AppState> for PageParams {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ValidQuery(raw) = ValidQuery::<RawPage>::from_request_parts(parts, state).await?;
        PageParams::new(raw.page_id, raw.page_size)
    }
}
