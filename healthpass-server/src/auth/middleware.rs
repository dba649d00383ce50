//! Authentication and authorization middleware
//!
//! [`require_auth`] resolves the token into a [`CurrentUser`] stored in the
//! request extensions; the guards below read it from there.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::context::{CurrentUser, load_current_user};
use super::jwt::JwtService;
use super::permissions::KNOWN_PERMISSIONS;
use crate::core::AppState;
use crate::security_log;
use crate::utils::ServiceError;

/// Cookie set by the login endpoint
pub const TOKEN_COOKIE: &str = "user-token";

/// Value of cookie `name` from the `Cookie` headers
fn cookie_value<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers()
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Token from the `user-token` cookie, else from `Authorization`
pub fn extract_token(req: &Request) -> Option<&str> {
    cookie_value(req, TOKEN_COOKIE).or_else(|| {
        req.headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_from_header)
    })
}

/// Require a logged-in user
///
/// Missing, invalid and expired tokens, and tokens of deleted users, all
/// answer `NotLogin`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(token) = extract_token(&req) else {
        security_log!("WARN", "auth_missing", uri = req.uri().to_string());
        return Err(AppError::not_login().into());
    };

    let user_id = match state.jwt.user_id(token) {
        Ok(id) => id,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );
            return Err(AppError::not_login().into());
        }
    };

    // Released before the handler runs
    let current = {
        let mut conn = state.pool.acquire().await?;
        load_current_user(&mut conn, user_id).await?
    };
    let Some(current) = current else {
        security_log!("WARN", "auth_unknown_user", user_id = user_id);
        return Err(AppError::not_login().into());
    };

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

/// Permission check middleware
///
/// `permission` must be listed in [`KNOWN_PERMISSIONS`]; debug builds panic
/// while the router is assembled otherwise.
///
/// ```ignore
/// Router::new()
///     .route("/manage-user", post(handler::create))
///     .layer(middleware::from_fn(require_permission("create-user")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    debug_assert!(
        KNOWN_PERMISSIONS.contains(&permission),
        "permission {permission:?} is not registered in KNOWN_PERMISSIONS"
    );
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_login)?;

            if !user.auth.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied());
            }

            Ok(next.run(req).await)
        })
    }
}

/// Superuser-only routes
pub async fn require_superuser(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_login)?;
    if !user.is_superuser() {
        security_log!(
            "WARN",
            "superuser_required",
            user_id = user.id(),
            uri = req.uri().to_string()
        );
        return Err(AppError::permission_denied());
    }

    Ok(next.run(req).await)
}
