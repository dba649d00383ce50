//! HTTP API
//!
//! # Routes (under `API_PREFIX`)
//!
//! - [`users`]: `/users/*`, registration, login and the caller's own account
//! - [`manage_user`]: `/manage-user/*`, other users, gated by `manage-user:{role_id}`
//! - [`roles`]: `/role/*`, the role tree and its members
//! - [`permissions`]: `/permissions/*`, superuser only
//! - [`forms`]: `/form/*`, health declarations
//! - [`constants`]: `/constants`, code tables
//!
//! Every answer is an [`ApiResponse`] envelope.

pub mod constants;
pub mod extract;
pub mod forms;
pub mod links;
pub mod manage_user;
pub mod permissions;
pub mod roles;
pub mod users;

use std::any::Any;

use axum::extract::{Request, State};
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use shared::error::AppError;
use shared::response::ApiResponse;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::alert::{AlertReport, spawn_report};
use crate::auth::permissions::CREATE_USER;
use crate::auth::{login_rate_limit, require_auth, require_permission, require_superuser};
use crate::core::AppState;
use crate::db::pagination::Page;

/// Paginated envelope for `page` served at `uri`
pub(crate) fn paged<T>(state: &AppState, uri: &Uri, page: Page<T>) -> ApiResponse<Vec<T>> {
    let links = links::page_links(&state.config.address, uri, &page);
    ApiResponse::paginated(page.items, links)
}

/// HTTP request logging middleware
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Ships the [`AlertReport`] a failed response carries
async fn dispatch_alerts(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Some(report) = response.extensions_mut().remove::<AlertReport>() {
        spawn_report(state.alerts.clone(), report);
    }
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %message, "Handler panicked");

    let mut response = AppError::not_defined().into_response();
    response.extensions_mut().insert(AlertReport::for_panic(&message));
    response
}

async fn not_found() -> AppError {
    AppError::not_found("page")
}

fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/register", post(users::register))
        .route(
            "/users/login",
            post(users::login).layer(middleware::from_fn_with_state(state.clone(), login_rate_limit)),
        )
        .route("/form", post(forms::create))
        .route("/constants", get(constants::get_constants))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users/reset-password", post(users::reset_password))
        .route("/users/delete", delete(users::delete_me))
}

fn manage_user_routes() -> Router<AppState> {
    Router::new()
        .route("/manage-user", get(manage_user::search))
        .route(
            "/manage-user",
            post(manage_user::create).layer(middleware::from_fn(require_permission(CREATE_USER))),
        )
        .route("/manage-user/ids", get(manage_user::search_ids))
        .route("/manage-user/reset-password", post(manage_user::reset_password))
        .route(
            "/manage-user/{id}",
            get(manage_user::read).put(manage_user::update),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/role", get(roles::list))
        .route("/role/search", get(roles::roles_of_user))
        .route("/role/{id}", put(roles::rename))
        .route("/role/{id}/users", get(roles::users))
        .route("/role/{id}/users:add", post(roles::add_users))
        .route("/role/{id}/users:delete", post(roles::remove_users))
}

fn superuser_routes() -> Router<AppState> {
    Router::new()
        .route("/role", post(roles::create))
        .route("/role/{id}", delete(roles::delete))
        .route("/role/{id}/permission:add", post(roles::add_permissions))
        .route("/role/{id}/permission:delete", post(roles::remove_permissions))
        .route(
            "/permissions",
            get(permissions::list).post(permissions::create),
        )
        .route(
            "/permissions/{id}",
            put(permissions::rename).delete(permissions::delete),
        )
        .layer(middleware::from_fn(require_superuser))
}

fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/form", get(forms::list))
        .route("/form/search", post(forms::search))
        .route("/form/{id}", delete(forms::delete))
}

/// Routes relative to the API prefix
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(user_routes())
        .merge(manage_user_routes())
        .merge(role_routes())
        .merge(superuser_routes())
        .merge(form_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public_routes(state).merge(protected)
}

/// The complete application: routes under `API_PREFIX` plus the HTTP stack
pub fn build_app(state: AppState) -> Router {
    let prefix = format!("/{}", state.config.api_prefix.trim_matches('/'));
    let api = routes(&state);
    let app = if prefix == "/" {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    app.fallback(not_found)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state, dispatch_alerts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
