//! Permission Repository

use super::{RepoError, RepoResult};
use crate::db::pagination::{ListQuery, Page, paginate};
use shared::models::Permission;
use sqlx::SqliteConnection;

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(permission)
}

pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> RepoResult<Option<Permission>> {
    let permission =
        sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(conn)
            .await?;
    Ok(permission)
}

pub async fn list(conn: &mut SqliteConnection, page_id: i64, page_size: i64) -> RepoResult<Page<Permission>> {
    let query = ListQuery::new("id, name", "permissions").order_by("id");
    paginate(conn, &query, page_id, page_size).await
}

pub async fn create(conn: &mut SqliteConnection, name: &str) -> RepoResult<Permission> {
    if find_by_name(&mut *conn, name).await?.is_some() {
        return Err(RepoError::Duplicate(format!("permission {name}")));
    }
    let id: i64 = sqlx::query_scalar("INSERT INTO permissions (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Permission {
        id,
        name: name.to_string(),
    })
}

pub async fn rename(conn: &mut SqliteConnection, id: i64, name: &str) -> RepoResult<Permission> {
    if let Some(existing) = find_by_name(&mut *conn, name).await? {
        if existing.id != id {
            return Err(RepoError::Duplicate(format!("permission {name}")));
        }
    }
    let rows = sqlx::query("UPDATE permissions SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("permission {id}")));
    }
    Ok(Permission {
        id,
        name: name.to_string(),
    })
}

/// Remove the permission and every grant of it
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    sqlx::query("DELETE FROM permission_roles WHERE permission_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM permissions WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
