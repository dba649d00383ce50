//! Database Module
//!
//! Owns the SQLite connection pool and the table lifecycle used by the
//! `db create|clean|reset` commands.

pub mod pagination;
pub mod repository;
pub mod schema;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::core::Config;

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl DbService {
    /// Open the pool described by `config`
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let memory = is_memory_url(&config.database_url);
        let mut options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Each in-memory connection would see its own empty database
        let max_connections = if memory { 1 } else { config.db_max_connections.max(1) };
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs));
        if memory {
            // An in-memory database lives as long as its last connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            max_connections,
            "Database connection established (SQLite)"
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create every table that does not exist yet
    pub async fn create_tables(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in schema::CREATE_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        tracing::info!(tables = schema::TABLES.len(), "Tables created");
        Ok(())
    }

    /// Delete every row from every table; tables stay
    pub async fn clean(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for table in schema::TABLES.iter().rev() {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::info!("All rows deleted");
        Ok(())
    }

    /// Clean and then ensure the tables exist
    pub async fn reset(&self) -> Result<(), sqlx::Error> {
        self.create_tables().await?;
        self.clean().await?;
        Ok(())
    }
}

/// Single-connection in-memory database with every table created
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let db = DbService::connect(&Config::local("sqlite::memory:"))
        .await
        .unwrap();
    db.create_tables().await.unwrap();
    db.pool
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = test_pool().await;
        let db = DbService::from_pool(pool.clone());
        db.create_tables().await.unwrap();
        for table in schema::TABLES {
            assert_eq!(count(&pool, table).await, 0);
        }
    }

    #[tokio::test]
    async fn test_clean_keeps_tables() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO roles (name, parent_id, grand_id) VALUES ('A', 0, '')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (1, 1)")
            .execute(&pool)
            .await
            .unwrap();

        let db = DbService::from_pool(pool.clone());
        db.clean().await.unwrap();
        assert_eq!(count(&pool, "roles").await, 0);
        assert_eq!(count(&pool, "user_roles").await, 0);

        db.reset().await.unwrap();
        assert_eq!(count(&pool, "roles").await, 0);
    }

    #[test]
    fn test_memory_url_detection() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file:x?mode=memory"));
        assert!(!is_memory_url("sqlite://healthpass.db"));
    }
}
