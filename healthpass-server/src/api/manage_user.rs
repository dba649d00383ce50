//! Manager endpoints over other users
//!
//! Reads and writes of a single user need `manage-user:{role_id}` for one of
//! the target's roles. Batch operations are all or nothing.

use axum::extract::{OriginalUri, Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::constants::DEFAULT_RESET_PASSWORD;
use shared::error::AppError;
use shared::models::{ManagedUserUpdate, UserBrief, UserCreate, UserDetail};
use shared::response::ApiResponse;

use super::extract::{PageParams, ValidJson, ValidQuery};
use super::paged;
use super::users::{hash, validate_user_create, validate_user_update};
use crate::auth::CurrentUser;
use crate::auth::permissions::{can_manage_role, can_manage_user_id, can_manage_user_ids};
use crate::core::AppState;
use crate::db::repository::{role, user};
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::ServiceResult;

fn check_sex(sex: Option<i64>) -> Result<Option<i64>, AppError> {
    match sex {
        Some(s) if !(1..=2).contains(&s) => {
            Err(AppError::invalid_param("sex must be 1 or 2").with_field("sex"))
        }
        other => Ok(other),
    }
}

#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    sex: Option<i64>,
    keyword: Option<String>,
}

/// GET /manage-user/ids
pub async fn search_ids(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<IdsQuery>,
) -> ServiceResult<ApiResponse<Vec<i64>>> {
    let filter = user::UserFilter {
        sex: check_sex(query.sex)?,
        keyword_name: query.keyword,
        user_identity: None,
    };
    let mut conn = state.pool.acquire().await?;
    let ids = user::search_ids(&mut conn, &filter).await?;
    Ok(ApiResponse::success(ids))
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    role_id: Option<i64>,
    sex: Option<i64>,
    keyword_name: Option<String>,
    user_identity: Option<i64>,
}

/// GET /manage-user: users of a role the actor manages
pub async fn search(
    State(state): State<AppState>,
    current: CurrentUser,
    OriginalUri(uri): OriginalUri,
    page: PageParams,
    ValidQuery(query): ValidQuery<UserSearchQuery>,
) -> ServiceResult<ApiResponse<Vec<UserBrief>>> {
    let Some(role_id) = query.role_id else {
        return Err(AppError::invalid_param("role_id is required").with_field("role_id").into());
    };
    let filter = user::UserFilter {
        sex: check_sex(query.sex)?,
        keyword_name: query.keyword_name,
        user_identity: query.user_identity,
    };

    let mut conn = state.pool.acquire().await?;
    let target = role::find_by_id(&mut conn, role_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("role {role_id}")))?;
    if !can_manage_role(&target, &current) {
        security_log!("WARN", "role_search_denied", user_id = current.id(), role_id = role_id);
        return Err(AppError::permission_error().into());
    }

    let result = user::search_in_role(&mut conn, role_id, &filter, page.page_id, page.page_size).await?;
    Ok(paged(&state, &uri, result.map(|u| UserBrief::from(&u))))
}

/// GET /manage-user/{id}
pub async fn read(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<UserDetail>> {
    let mut conn = state.pool.acquire().await?;
    let target = user::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {id}")))?;
    if !can_manage_user_id(&mut conn, &current, id).await? {
        return Err(AppError::permission_error().into());
    }
    Ok(ApiResponse::success(UserDetail::from(&target)))
}

/// PUT /manage-user/{id}; every field is overwritten, including the name
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(data): ValidJson<ManagedUserUpdate>,
) -> ServiceResult<ApiResponse<UserDetail>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    let (name, data) = data.into_parts();
    validate_user_update(&data)?;

    let mut tx = state.pool.begin().await?;
    if user::find_by_id(&mut tx, id).await?.is_none() {
        return Err(AppError::not_found(format!("user {id}")).into());
    }
    if !can_manage_user_id(&mut tx, &current, id).await? {
        return Err(AppError::permission_error().into());
    }
    let updated = user::update_profile(&mut tx, id, Some(&name), &data).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), target_id = id, "Managed user updated");
    Ok(ApiResponse::success(UserDetail::from(&updated)))
}

/// POST /manage-user; guarded by `create-user`
///
/// An empty password falls back to the default reset password.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(data): ValidJson<UserCreate>,
) -> ServiceResult<ApiResponse<UserDetail>> {
    validate_user_create(&data, false)?;
    let password = if data.password.is_empty() {
        DEFAULT_RESET_PASSWORD
    } else {
        data.password.as_str()
    };
    let password_hash = hash(password)?;

    let mut tx = state.pool.begin().await?;
    let created = user::create(&mut tx, &data, &password_hash).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), created_id = created.id, "User created by manager");
    Ok(ApiResponse::success(UserDetail::from(&created)))
}

/// POST /manage-user/reset-password; body is a list of user ids
pub async fn reset_password(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(user_ids): ValidJson<Vec<i64>>,
) -> ServiceResult<ApiResponse<Value>> {
    let mut tx = state.pool.begin().await?;
    let (allowed, ids) = can_manage_user_ids(&mut tx, &current, &user_ids).await?;
    if !allowed {
        return Err(AppError::permission_error().into());
    }

    let password_hash = hash(DEFAULT_RESET_PASSWORD)?;
    user::set_password(&mut tx, &ids, &password_hash).await?;
    tx.commit().await?;

    security_log!("INFO", "password_reset", user_id = current.id(), count = ids.len());
    Ok(ApiResponse::success(json!({ "count": ids.len() })))
}
