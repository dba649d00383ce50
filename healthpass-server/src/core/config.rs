//! Server configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | DATABASE_URL | sqlite:healthpass.db | SQLite database |
//! | DB_MAX_CONNECTIONS | 10 | pool size |
//! | DB_ACQUIRE_TIMEOUT_SECS | 30 | wait for a pooled connection |
//! | HOST | 0.0.0.0 | bind address |
//! | HTTP_PORT | 8000 | bind port |
//! | ENVIRONMENT | development | development / staging / production |
//! | ADDRESS | http://localhost:{HTTP_PORT} | public base URL used in page links |
//! | API_PREFIX | /api/v1 | route prefix |
//! | JWT_SECRET | dev fallback | token signing key, required outside development |
//! | TOKEN_TTL_HOURS | 31 | token lifetime |
//! | ALERT_WEBHOOK_URL | unset | where unexpected errors are reported |
//! | LOGIN_RATE_LIMIT | 10 | login attempts per IP per minute |
//! | LOG_LEVEL | info | default filter when RUST_LOG is unset |
//! | LOG_DIR | unset | daily rolling log files |

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    MissingSecret(String, String),
    #[error("{0} must not be empty in {1} environment")]
    EmptySecret(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub host: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Public base URL, no trailing slash
    pub address: String,
    pub api_prefix: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub alert_webhook_url: Option<String>,
    pub login_rate_limit: u32,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, ConfigError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ConfigError::MissingSecret(name.into(), environment.into()));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ConfigError::EmptySecret(name.into(), environment.into()));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let http_port = env_or("HTTP_PORT", 8000);

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:healthpass.db".into()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            db_acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 30),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port,
            address: env_opt("ADDRESS")
                .map(|a| a.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{http_port}")),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".into()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            token_ttl_hours: env_or("TOKEN_TTL_HOURS", 31),
            alert_webhook_url: env_opt("ALERT_WEBHOOK_URL"),
            login_rate_limit: env_or("LOGIN_RATE_LIMIT", 10),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            environment,
        })
    }

    /// Development configuration over the given database, ignoring the environment
    ///
    /// Used by tests and tooling.
    pub fn local(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            db_max_connections: 1,
            db_acquire_timeout_secs: 5,
            host: "127.0.0.1".into(),
            http_port: 8000,
            environment: "development".into(),
            address: "http://localhost:8000".into(),
            api_prefix: "/api/v1".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            token_ttl_hours: 31,
            alert_webhook_url: None,
            login_rate_limit: 10,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config() {
        let config = Config::local("sqlite::memory:");
        assert!(!config.is_production());
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.token_ttl_hours, 31);
    }

    #[test]
    fn test_require_secret_dev_fallback() {
        let secret = Config::require_secret("HEALTHPASS_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(secret, "dev-HEALTHPASS_TEST_UNSET_SECRET-not-for-production");

        let err = Config::require_secret("HEALTHPASS_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(..)));
    }
}
