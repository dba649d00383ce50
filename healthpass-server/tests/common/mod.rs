//! Harness driving the router in-process over an in-memory database

use axum::Router;
use axum::body::Body;
use healthpass_server::db::DbService;
use healthpass_server::db::repository::user;
use healthpass_server::{AppState, Config, build_app};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PREFIX: &str = "/api/v1";
pub const PASSWORD: &str = "secret-pass";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl Reply {
    pub fn code(&self) -> u64 {
        self.body["code"].as_u64().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::local("sqlite::memory:")).await
    }

    pub async fn with_config(config: Config) -> Self {
        let state = AppState::new(config).await.unwrap();
        DbService::from_pool(state.pool.clone())
            .create_tables()
            .await
            .unwrap();
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    pub async fn request(&self, method: &str, path: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{PREFIX}{path}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply {
            status,
            body,
            set_cookie,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Reply {
        self.request("GET", path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Reply {
        self.request("POST", path, token, Some(body)).await
    }

    /// Register a user and return its id
    pub async fn register(&self, name: &str, phone: &str) -> i64 {
        let reply = self
            .post(
                "/users/register",
                None,
                json!({"name": name, "sex": 1, "phone": phone, "password": PASSWORD}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.data()["id"].as_i64().unwrap()
    }

    pub async fn login(&self, phone: &str) -> String {
        let reply = self
            .post("/users/login", None, json!({"phone": phone, "password": PASSWORD}))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.data()["user_token"].as_str().unwrap().to_owned()
    }

    /// Register, promote to superuser and log in
    pub async fn superuser(&self) -> String {
        let phone = "13000000000";
        let id = self.register("root", phone).await;
        {
            let mut conn = self.state.pool.acquire().await.unwrap();
            user::set_superuser(&mut conn, id, true).await.unwrap();
        }
        self.login(phone).await
    }

    /// Create a role as `token` and return its id
    pub async fn create_role(&self, token: &str, name: &str, parent_id: i64) -> i64 {
        let reply = self
            .post("/role", Some(token), json!({"name": name, "parent_id": parent_id}))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.data()["id"].as_i64().unwrap()
    }
}
