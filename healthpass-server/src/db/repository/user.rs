//! User Repository

use super::{RepoError, RepoResult};
use crate::db::pagination::{ListQuery, Page, paginate, placeholders};
use shared::models::{User, UserCreate, UserUpdate};
use shared::util::now_secs;
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, phone, password, is_superuser, create_at, update_at, is_active, \
                       name, sex, address, nation, birthday, user_identity";

/// Filters shared by the manager searches
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub sex: Option<i64>,
    /// Case-insensitive substring of the name
    pub keyword_name: Option<String>,
    /// Users having any of these identity bits
    pub user_identity: Option<i64>,
}

/// `LIKE` pattern matching `keyword` literally anywhere in the value
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl UserFilter {
    fn apply(&self, query: ListQuery) -> ListQuery {
        let mut query = query.filter_eq("users.sex", self.sex);
        if let Some(keyword) = self.keyword_name.as_deref().filter(|k| !k.is_empty()) {
            query = query.filter("users.name LIKE ? ESCAPE '\\'", [contains_pattern(keyword)]);
        }
        if let Some(identity) = self.user_identity {
            query = query.filter("(users.user_identity & ?) != 0", [identity]);
        }
        query
    }
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

pub async fn find_by_phone(conn: &mut SqliteConnection, phone: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE phone = ? LIMIT 1"
    ))
    .bind(phone)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

/// Users among `ids`; unknown ids are skipped
pub async fn find_by_ids(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {COLUMNS} FROM users WHERE id IN ({}) ORDER BY id",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, User>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(conn).await?)
}

/// Insert a user with an already hashed password
pub async fn create(
    conn: &mut SqliteConnection,
    data: &UserCreate,
    password_hash: &str,
) -> RepoResult<User> {
    if find_by_phone(&mut *conn, &data.phone).await?.is_some() {
        return Err(RepoError::Duplicate(format!("phone {}", data.phone)));
    }
    let now = now_secs();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (phone, password, is_superuser, create_at, update_at, is_active, name, sex, address, user_identity) \
         VALUES (?, ?, 0, ?, ?, 1, ?, ?, '', 0) RETURNING id",
    )
    .bind(&data.phone)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .bind(&data.name)
    .bind(data.sex.code())
    .fetch_one(&mut *conn)
    .await?;

    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("user {id}")))
}

/// Overwrite the profile fields; `name` is only changed when given
pub async fn update_profile(
    conn: &mut SqliteConnection,
    id: i64,
    name: Option<&str>,
    data: &UserUpdate,
) -> RepoResult<User> {
    let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE phone = ? AND id != ? LIMIT 1")
        .bind(&data.phone)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    if taken.is_some() {
        return Err(RepoError::Duplicate(format!("phone {}", data.phone)));
    }

    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?, name), sex = ?, phone = ?, address = ?, nation = ?, birthday = ?, update_at = ? \
         WHERE id = ?",
    )
    .bind(name)
    .bind(data.sex.code())
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.nation)
    .bind(data.birthday)
    .bind(now_secs())
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("user {id}")));
    }

    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("user {id}")))
}

/// Store a new password hash for every user in `ids`, returns rows changed
pub async fn set_password(
    conn: &mut SqliteConnection,
    ids: &[i64],
    password_hash: &str,
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE users SET password = ?, update_at = ? WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql).bind(password_hash).bind(now_secs());
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.execute(conn).await?.rows_affected())
}

/// Delete the user row and its role memberships
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Ids of all users matching `filter`
pub async fn search_ids(conn: &mut SqliteConnection, filter: &UserFilter) -> RepoResult<Vec<i64>> {
    #[derive(sqlx::FromRow)]
    struct IdRow {
        id: i64,
    }
    let query = filter.apply(ListQuery::new("users.id", "users").order_by("users.id"));
    let rows: Vec<IdRow> = query.fetch_all(conn).await?;
    Ok(rows.into_iter().map(|r| r.id).collect())
}

/// Members of `role_id` matching `filter`, each user once
pub async fn search_in_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    filter: &UserFilter,
    page_id: i64,
    page_size: i64,
) -> RepoResult<Page<User>> {
    let query = ListQuery::new(COLUMNS, "users")
        .filter(
            "users.id IN (SELECT user_id FROM user_roles WHERE role_id = ?)",
            [role_id],
        )
        .order_by("users.id");
    paginate(conn, &filter.apply(query), page_id, page_size).await
}

/// Promote or demote a user; used by tooling and tests
pub async fn set_superuser(conn: &mut SqliteConnection, id: i64, is_superuser: bool) -> RepoResult<()> {
    sqlx::query("UPDATE users SET is_superuser = ? WHERE id = ?")
        .bind(is_superuser)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
