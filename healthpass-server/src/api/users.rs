//! Self-service user endpoints: register, login, profile, password, account removal

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use shared::error::AppError;
use shared::models::{LoginRequest, LoginResponse, UserBrief, UserCreate, UserDetail, UserUpdate};
use shared::response::ApiResponse;

use super::extract::ValidJson;
use crate::auth::{CurrentUser, TOKEN_COOKIE, hash_password, verify_password};
use crate::core::AppState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_max_len, validate_phone,
    validate_required_text,
};
use crate::utils::{ServiceError, ServiceResult};

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    validate_required_text(password, "password", MAX_PASSWORD_LEN)
}

/// `require_password` is false for managers, who may leave it empty
pub(crate) fn validate_user_create(data: &UserCreate, require_password: bool) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_phone(&data.phone, "phone")?;
    if require_password || !data.password.is_empty() {
        validate_password(&data.password)?;
    }
    Ok(())
}

pub(crate) fn validate_user_update(data: &UserUpdate) -> Result<(), AppError> {
    validate_phone(&data.phone, "phone")?;
    validate_max_len(&data.address, "address", MAX_ADDRESS_LEN)
}

pub(crate) fn hash(password: &str) -> ServiceResult<String> {
    hash_password(password).map_err(ServiceError::unexpected)
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(data): ValidJson<UserCreate>,
) -> ServiceResult<ApiResponse<UserDetail>> {
    validate_user_create(&data, true)?;
    let password_hash = hash(&data.password)?;

    let mut tx = state.pool.begin().await?;
    let created = user::create(&mut tx, &data, &password_hash).await?;
    tx.commit().await?;

    tracing::info!(user_id = created.id, "User registered");
    Ok(ApiResponse::success(UserDetail::from(&created)))
}

/// POST /users/login
///
/// The token is returned in the body and in the `user-token` cookie.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(data): ValidJson<LoginRequest>,
) -> ServiceResult<Response> {
    let found = {
        let mut conn = state.pool.acquire().await?;
        user::find_by_phone(&mut conn, &data.phone).await?
    };
    let Some(found) = found.filter(|u| verify_password(&data.password, &u.password)) else {
        security_log!("WARN", "login_failed", phone = data.phone.as_str());
        return Err(AppError::wrong_password().into());
    };

    let token = state
        .jwt
        .generate_token(found.id)
        .map_err(ServiceError::unexpected)?;
    tracing::info!(user_id = found.id, "User logged in");

    let cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly");
    let body = ApiResponse::success(LoginResponse {
        user: UserDetail::from(&found),
        user_token: token,
    });
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// GET /users/me
pub async fn me(current: CurrentUser) -> ApiResponse<UserDetail> {
    ApiResponse::success(UserDetail::from(&current.user))
}

/// PUT /users/me; every field is overwritten except the name
pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(data): ValidJson<UserUpdate>,
) -> ServiceResult<ApiResponse<UserDetail>> {
    validate_user_update(&data)?;

    let mut tx = state.pool.begin().await?;
    let updated = user::update_profile(&mut tx, current.id(), None, &data).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(UserDetail::from(&updated)))
}

/// POST /users/reset-password; the body is the new password as a JSON string
pub async fn reset_password(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(password): ValidJson<String>,
) -> ServiceResult<ApiResponse<UserBrief>> {
    validate_password(&password)?;
    let password_hash = hash(&password)?;

    let mut tx = state.pool.begin().await?;
    user::set_password(&mut tx, &[current.id()], &password_hash).await?;
    tx.commit().await?;

    security_log!("INFO", "password_changed", user_id = current.id());
    Ok(ApiResponse::success(UserBrief::from(&current.user)))
}

/// DELETE /users/delete
pub async fn delete_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ServiceResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    user::delete(&mut tx, current.id()).await?;
    tx.commit().await?;

    tracing::info!(user_id = current.id(), "User deleted own account");
    Ok(ApiResponse::ok())
}
