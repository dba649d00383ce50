//! Permission CRUD, superuser only

use axum::extract::{OriginalUri, Path, State};
use shared::error::AppError;
use shared::models::{Permission, PermissionInput};
use shared::response::ApiResponse;

use super::extract::{PageParams, ValidJson};
use super::paged;
use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::repository::permission;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::ServiceResult;

/// GET /permissions
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    page: PageParams,
) -> ServiceResult<ApiResponse<Vec<Permission>>> {
    let mut conn = state.pool.acquire().await?;
    let result = permission::list(&mut conn, page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result))
}

/// POST /permissions
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(data): ValidJson<PermissionInput>,
) -> ServiceResult<ApiResponse<Permission>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;

    let mut tx = state.pool.begin().await?;
    let created = permission::create(&mut tx, &data.name).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), permission = %created.name, "Permission created");
    Ok(ApiResponse::success(created))
}

/// PUT /permissions/{id}
pub async fn rename(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(data): ValidJson<PermissionInput>,
) -> ServiceResult<ApiResponse<Permission>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;

    let mut tx = state.pool.begin().await?;
    let renamed = permission::rename(&mut tx, id, &data.name).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), permission_id = id, permission = %renamed.name, "Permission renamed");
    Ok(ApiResponse::success(renamed))
}

/// DELETE /permissions/{id}; role grants of the permission go with it
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    if !permission::delete(&mut tx, id).await? {
        return Err(AppError::not_found(format!("permission {id}")).into());
    }
    tx.commit().await?;

    tracing::info!(user_id = current.id(), permission_id = id, "Permission deleted");
    Ok(ApiResponse::ok())
}
