//! Bulk maintenance of the `user_identity` bitmask
//!
//! Every operation is integer arithmetic on the column. Empty id lists issue
//! no statement.

use super::RepoResult;
use crate::db::pagination::placeholders;
use shared::constants::UserIdentity;
use sqlx::SqliteConnection;

/// `user_identity |= flag` for `user_ids`
pub async fn set_flags(conn: &mut SqliteConnection, user_ids: &[i64], flag: i64) -> RepoResult<u64> {
    if user_ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE users SET user_identity = user_identity | ? WHERE id IN ({})",
        placeholders(user_ids.len())
    );
    let mut query = sqlx::query(&sql).bind(flag);
    for id in user_ids {
        query = query.bind(id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

/// `user_identity -= flag` for users of `user_ids` that fully hold `flag`
pub async fn clear_flags_if_set(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
    flag: i64,
) -> RepoResult<u64> {
    if user_ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE users SET user_identity = user_identity - ? \
         WHERE (user_identity & ?) = ? AND id IN ({})",
        placeholders(user_ids.len())
    );
    let mut query = sqlx::query(&sql).bind(flag).bind(flag).bind(flag);
    for id in user_ids {
        query = query.bind(id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

/// Clear `clear_flag` where fully set and OR in `set_flag`, in one statement
pub async fn set_then_clear(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
    set_flag: i64,
    clear_flag: i64,
) -> RepoResult<u64> {
    if user_ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE users SET user_identity = \
         (CASE WHEN (user_identity & ?) = ? THEN user_identity - ? ELSE user_identity END) | ? \
         WHERE id IN ({})",
        placeholders(user_ids.len())
    );
    let mut query = sqlx::query(&sql)
        .bind(clear_flag)
        .bind(clear_flag)
        .bind(clear_flag)
        .bind(set_flag);
    for id in user_ids {
        query = query.bind(id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

/// Drop `ADMIN` from the users of `user_ids` that no longer belong to any role
///
/// Never sets the flag. Returns the ids that were orphaned.
pub async fn recompute_admin_flag_if_orphaned(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
) -> RepoResult<Vec<i64>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT user_id FROM user_roles WHERE user_id IN ({}) GROUP BY user_id HAVING COUNT(*) > 0",
        placeholders(user_ids.len())
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for id in user_ids {
        query = query.bind(id);
    }
    let still_member = query.fetch_all(&mut *conn).await?;

    let mut orphaned: Vec<i64> = user_ids
        .iter()
        .copied()
        .filter(|id| !still_member.contains(id))
        .collect();
    orphaned.sort_unstable();
    orphaned.dedup();

    clear_flags_if_set(conn, &orphaned, UserIdentity::ADMIN).await?;
    Ok(orphaned)
}
