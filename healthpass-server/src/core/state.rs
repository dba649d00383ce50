//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use super::Config;
use crate::alert::{AlertSink, sink_from_config};
use crate::auth::{JwtService, RateLimiter};
use crate::db::DbService;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: JwtService,
    /// Where unexpected failures are reported
    pub alerts: Arc<dyn AlertSink>,
    /// Login throttling
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Open the database and wire every service from `config`
    pub async fn new(config: Config) -> Result<Self, sqlx::Error> {
        let db = DbService::connect(&config).await?;
        let alerts = sink_from_config(config.alert_webhook_url.as_deref());
        Ok(Self::with_parts(db.pool, config, alerts))
    }

    pub fn with_parts(pool: SqlitePool, config: Config, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            jwt: JwtService::new(&config.jwt_secret, config.token_ttl_hours),
            pool,
            config: Arc::new(config),
            alerts,
            rate_limiter: RateLimiter::new(),
        }
    }
}
