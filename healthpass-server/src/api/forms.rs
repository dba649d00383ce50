//! Health declaration forms
//!
//! Anyone may submit a form; reading and deleting needs a login.

use axum::extract::{OriginalUri, Path, State};
use shared::error::AppError;
use shared::models::{Form, FormCreate, FormSearch};
use shared::response::ApiResponse;

use super::extract::{PageParams, ValidJson};
use super::paged;
use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::repository::form;
use crate::utils::validation::{MAX_NAME_LEN, validate_id_card, validate_phone, validate_required_text};
use crate::utils::ServiceResult;

fn validate_form(data: &FormCreate) -> Result<(), AppError> {
    for (value, field) in [
        (&data.name, "name"),
        (&data.org_name, "org_name"),
        (&data.car_id, "car_id"),
        (&data.reason, "reason"),
        (&data.guarantor, "guarantor"),
    ] {
        validate_required_text(value, field, MAX_NAME_LEN)?;
    }
    validate_phone(&data.phone, "phone")?;
    validate_phone(&data.guarantor_phone, "guarantor_phone")?;
    validate_id_card(&data.id_card, "IDCard")
}

/// POST /form (public)
pub async fn create(
    State(state): State<AppState>,
    ValidJson(data): ValidJson<FormCreate>,
) -> ServiceResult<ApiResponse<Form>> {
    validate_form(&data)?;

    let mut tx = state.pool.begin().await?;
    let created = form::create(&mut tx, &data).await?;
    tx.commit().await?;

    tracing::info!(form_id = created.id, "Form submitted");
    Ok(ApiResponse::success(created))
}

/// GET /form: every form, newest first
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    page: PageParams,
) -> ServiceResult<ApiResponse<Vec<Form>>> {
    let mut conn = state.pool.acquire().await?;
    let result = form::search(&mut conn, &FormSearch::default(), page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result))
}

/// POST /form/search: filters in the body, paging in the query string
pub async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    page: PageParams,
    ValidJson(filters): ValidJson<FormSearch>,
) -> ServiceResult<ApiResponse<Vec<Form>>> {
    let mut conn = state.pool.acquire().await?;
    let result = form::search(&mut conn, &filters, page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result))
}

/// DELETE /form/{id}; answers with the removed form
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<Form>> {
    let mut tx = state.pool.begin().await?;
    let found = form::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("form {id}")))?;
    form::delete(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), form_id = id, "Form deleted");
    Ok(ApiResponse::success(found))
}
