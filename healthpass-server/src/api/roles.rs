//! Role endpoints
//!
//! Any logged-in user sees the roles it holds and their descendants, lists
//! their members, renames them and moves users it manages in and out.
//! Creating and deleting roles and granting permissions is superuser only.

use axum::extract::{OriginalUri, Path, State};
use serde::Deserialize;
use shared::constants::UserIdentity;
use shared::error::AppError;
use shared::models::{Role, RoleCreate, RoleUpdate, UserBrief};
use shared::response::ApiResponse;
use sqlx::SqliteConnection;

use super::extract::{PageParams, ValidJson, ValidQuery};
use super::paged;
use crate::auth::CurrentUser;
use crate::auth::permissions::{can_manage_role, can_manage_user_id, can_manage_user_ids};
use crate::core::AppState;
use crate::db::pagination::Page;
use crate::db::repository::{identity, membership, role};
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::ServiceResult;

/// The role `role_id`, provided `current` manages it
async fn managed_role(
    conn: &mut SqliteConnection,
    current: &CurrentUser,
    role_id: i64,
) -> ServiceResult<Role> {
    let found = role::find_by_id(conn, role_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("role {role_id}")))?;
    if !can_manage_role(&found, current) {
        security_log!("WARN", "role_access_denied", user_id = current.id(), role_id = role_id);
        return Err(AppError::permission_error().into());
    }
    Ok(found)
}

/// Existing ids of `user_ids`, provided `current` manages every one of them
async fn managed_users(
    conn: &mut SqliteConnection,
    current: &CurrentUser,
    user_ids: &[i64],
) -> ServiceResult<Vec<i64>> {
    let (allowed, ids) = can_manage_user_ids(conn, current, user_ids).await?;
    if !allowed {
        return Err(AppError::permission_error().into());
    }
    Ok(ids)
}

/// GET /role: roles visible to the actor
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    OriginalUri(uri): OriginalUri,
    page: PageParams,
) -> ServiceResult<ApiResponse<Vec<Role>>> {
    let role_ids: Vec<i64> = current.auth.role_id_set.iter().copied().collect();
    if !current.is_superuser() && role_ids.is_empty() {
        return Ok(paged(&state, &uri, Page::<Role>::empty(page.page_size as u64)));
    }
    let scope = (!current.is_superuser()).then_some(role_ids.as_slice());

    let mut conn = state.pool.acquire().await?;
    let result = role::list_visible(&mut conn, scope, page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result))
}

#[derive(Debug, Deserialize)]
pub struct RolesOfUserQuery {
    user_id: i64,
}

/// GET /role/search?user_id=: roles of one user, for itself or a manager
pub async fn roles_of_user(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidQuery(query): ValidQuery<RolesOfUserQuery>,
) -> ServiceResult<ApiResponse<Vec<Role>>> {
    let mut conn = state.pool.acquire().await?;
    if query.user_id != current.id() && !can_manage_user_id(&mut conn, &current, query.user_id).await? {
        return Err(AppError::permission_error().into());
    }
    let roles = role::roles_of_user(&mut conn, query.user_id).await?;
    Ok(ApiResponse::success(roles))
}

/// GET /role/{id}/users
pub async fn users(
    State(state): State<AppState>,
    current: CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    page: PageParams,
) -> ServiceResult<ApiResponse<Vec<UserBrief>>> {
    let mut conn = state.pool.acquire().await?;
    managed_role(&mut conn, &current, id).await?;
    let result = role::users_of_role(&mut conn, id, page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result.map(|u| UserBrief::from(&u))))
}

/// PUT /role/{id}: rename
pub async fn rename(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(data): ValidJson<RoleUpdate>,
) -> ServiceResult<ApiResponse<Role>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;

    let mut tx = state.pool.begin().await?;
    managed_role(&mut tx, &current, id).await?;
    let renamed = role::rename(&mut tx, id, &data.name).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), role_id = id, name = %renamed.name, "Role renamed");
    Ok(ApiResponse::success(renamed))
}

/// POST /role/{id}/users:add; members gain the ADMIN identity
pub async fn add_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(user_ids): ValidJson<Vec<i64>>,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    managed_role(&mut tx, &current, id).await?;
    let ids = managed_users(&mut tx, &current, &user_ids).await?;

    membership::add_users_to_role(&mut tx, id, &ids).await?;
    identity::set_flags(&mut tx, &ids, UserIdentity::ADMIN).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), role_id = id, count = ids.len(), "Users added to role");
    Ok(ApiResponse::ok())
}

/// POST /role/{id}/users:delete; users left without roles lose ADMIN
pub async fn remove_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(user_ids): ValidJson<Vec<i64>>,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    managed_role(&mut tx, &current, id).await?;
    let ids = managed_users(&mut tx, &current, &user_ids).await?;

    membership::remove_users_from_role(&mut tx, id, &ids).await?;
    identity::recompute_admin_flag_if_orphaned(&mut tx, &ids).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), role_id = id, count = ids.len(), "Users removed from role");
    Ok(ApiResponse::ok())
}

/// POST /role (superuser)
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(data): ValidJson<RoleCreate>,
) -> ServiceResult<ApiResponse<Role>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    if data.parent_id < 0 {
        return Err(AppError::invalid_param("parent_id must not be negative")
            .with_field("parent_id")
            .into());
    }

    let mut tx = state.pool.begin().await?;
    let created = role::create(&mut tx, &data).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = current.id(),
        role_id = created.id,
        grand_id = %created.grand_id,
        "Role created"
    );
    Ok(ApiResponse::success(created))
}

/// DELETE /role/{id} (superuser)
///
/// Refused while child roles exist. Former members left without roles lose
/// ADMIN.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<Role>> {
    let mut tx = state.pool.begin().await?;
    let found = managed_role(&mut tx, &current, id).await?;
    if role::has_children(&mut tx, id).await? {
        return Err(AppError::invalid_param("role still has child roles").into());
    }

    let members = membership::user_ids_of_role(&mut tx, id).await?;
    role::delete(&mut tx, id).await?;
    identity::recompute_admin_flag_if_orphaned(&mut tx, &members).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), role_id = id, members = members.len(), "Role deleted");
    Ok(ApiResponse::success(found))
}

/// POST /role/{id}/permission:add (superuser)
pub async fn add_permissions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(permission_ids): ValidJson<Vec<i64>>,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    managed_role(&mut tx, &current, id).await?;
    membership::add_permissions_to_role(&mut tx, id, &permission_ids).await?;
    tx.commit().await?;

    security_log!(
        "INFO",
        "role_permissions_granted",
        user_id = current.id(),
        role_id = id,
        permission_ids = format!("{permission_ids:?}")
    );
    Ok(ApiResponse::ok())
}

/// POST /role/{id}/permission:delete (superuser)
pub async fn remove_permissions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(permission_ids): ValidJson<Vec<i64>>,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    managed_role(&mut tx, &current, id).await?;
    membership::remove_permissions_from_role(&mut tx, id, &permission_ids).await?;
    tx.commit().await?;

    security_log!(
        "INFO",
        "role_permissions_revoked",
        user_id = current.id(),
        role_id = id,
        permission_ids = format!("{permission_ids:?}")
    );
    Ok(ApiResponse::ok())
}
