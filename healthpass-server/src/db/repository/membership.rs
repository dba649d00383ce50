//! User↔Role and Permission↔Role links
//!
//! Inserts never deduplicate; deletes remove every matching row.

use std::collections::BTreeMap;

use super::RepoResult;
use crate::db::pagination::placeholders;
use sqlx::SqliteConnection;

/// Multi-row insert of `(left, role_id)` pairs
async fn insert_links(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    role_id: i64,
    ids: &[i64],
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let values = vec!["(?, ?)"; ids.len()].join(", ");
    let sql = format!("INSERT INTO {table} ({column}, role_id) VALUES {values}");
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id).bind(role_id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

async fn delete_links(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    role_id: i64,
    ids: &[i64],
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM {table} WHERE role_id = ? AND {column} IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql).bind(role_id);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

pub async fn add_users_to_role(conn: &mut SqliteConnection, role_id: i64, user_ids: &[i64]) -> RepoResult<u64> {
    insert_links(conn, "user_roles", "user_id", role_id, user_ids).await
}

pub async fn remove_users_from_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    user_ids: &[i64],
) -> RepoResult<u64> {
    delete_links(conn, "user_roles", "user_id", role_id, user_ids).await
}

pub async fn add_permissions_to_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    permission_ids: &[i64],
) -> RepoResult<u64> {
    insert_links(conn, "permission_roles", "permission_id", role_id, permission_ids).await
}

pub async fn remove_permissions_from_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    permission_ids: &[i64],
) -> RepoResult<u64> {
    delete_links(conn, "permission_roles", "permission_id", role_id, permission_ids).await
}

/// Distinct members of `role_id`
pub async fn user_ids_of_role(conn: &mut SqliteConnection, role_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT user_id FROM user_roles WHERE role_id = ? ORDER BY user_id",
    )
    .bind(role_id)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

/// Role ids of every existing user in `user_ids`, in one query
///
/// Users without roles map to an empty list; unknown ids are absent.
pub async fn role_ids_of_users(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
) -> RepoResult<BTreeMap<i64, Vec<i64>>> {
    let mut out: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    if user_ids.is_empty() {
        return Ok(out);
    }
    let sql = format!(
        "SELECT users.id, user_roles.role_id FROM users \
         LEFT JOIN user_roles ON user_roles.user_id = users.id \
         WHERE users.id IN ({}) ORDER BY users.id, user_roles.id",
        placeholders(user_ids.len())
    );
    let mut query = sqlx::query_as::<_, (i64, Option<i64>)>(&sql);
    for id in user_ids {
        query = query.bind(id);
    }
    for (user_id, role_id) in query.fetch_all(conn).await? {
        let roles = out.entry(user_id).or_default();
        if let Some(role_id) = role_id
            && !roles.contains(&role_id)
        {
            roles.push(role_id);
        }
    }
    Ok(out)
}
