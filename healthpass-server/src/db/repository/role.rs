//! Role Repository
//!
//! Roles are a forest; `grand_id` is computed once from the parent at
//! creation and never rewritten.

use super::{RepoError, RepoResult};
use crate::db::pagination::{ListQuery, Page, SqlArg, paginate};
use shared::models::{Role, RoleCreate, User, child_grand_id, descendant_pattern};
use sqlx::SqliteConnection;

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, parent_id, grand_id FROM roles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(role)
}

pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, parent_id, grand_id FROM roles WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(conn)
    .await?;
    Ok(role)
}

/// Insert a role below `data.parent_id` (0 for a root)
///
/// A missing parent row counts as a root parent: the child gets `|parent|`.
pub async fn create(conn: &mut SqliteConnection, data: &RoleCreate) -> RepoResult<Role> {
    if find_by_name(&mut *conn, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!("role {}", data.name)));
    }

    let parent_grand_id = if data.parent_id == 0 {
        String::new()
    } else {
        find_by_id(&mut *conn, data.parent_id)
            .await?
            .map(|parent| parent.grand_id)
            .unwrap_or_default()
    };
    let grand_id = child_grand_id(data.parent_id, &parent_grand_id);

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO roles (name, parent_id, grand_id) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.parent_id)
    .bind(&grand_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Role {
        id,
        name: data.name.clone(),
        parent_id: data.parent_id,
        grand_id,
    })
}

/// Change the name; another role already holding it is a duplicate
pub async fn rename(conn: &mut SqliteConnection, id: i64, name: &str) -> RepoResult<Role> {
    if let Some(existing) = find_by_name(&mut *conn, name).await? {
        if existing.id != id {
            return Err(RepoError::Duplicate(format!("role {name}")));
        }
    }
    let rows = sqlx::query("UPDATE roles SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("role {id}")));
    }
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("role {id}")))
}

/// Remove the role and its direct user and permission links
///
/// Descendant roles are left untouched.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    sqlx::query("DELETE FROM user_roles WHERE role_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM permission_roles WHERE role_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn has_children(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let child: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE parent_id = ? LIMIT 1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(child.is_some())
}

/// Roles whose id is in `role_ids` or that descend from one of them
///
/// `None` means no restriction (superuser).
pub fn visible_query(role_ids: Option<&[i64]>) -> ListQuery {
    let query = ListQuery::new("id, name, parent_id, grand_id", "roles").order_by("id");
    match role_ids {
        None => query,
        Some(ids) => {
            let mut group = Vec::with_capacity(ids.len() * 2);
            for &id in ids {
                group.push(("id = ?".to_string(), vec![SqlArg::Int(id)]));
                group.push((
                    "grand_id LIKE ?".to_string(),
                    vec![SqlArg::Text(descendant_pattern(id))],
                ));
            }
            if group.is_empty() {
                query.filter_in("id", &[])
            } else {
                query.filter_any(group)
            }
        }
    }
}

pub async fn list_visible(
    conn: &mut SqliteConnection,
    role_ids: Option<&[i64]>,
    page_id: i64,
    page_size: i64,
) -> RepoResult<Page<Role>> {
    paginate(conn, &visible_query(role_ids), page_id, page_size).await
}

/// Roles `user_id` belongs to, each once
pub async fn roles_of_user(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name, parent_id, grand_id FROM roles \
         WHERE id IN (SELECT role_id FROM user_roles WHERE user_id = ?) ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(roles)
}

/// Members of `role_id`; duplicate membership rows yield one user
pub async fn users_of_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    page_id: i64,
    page_size: i64,
) -> RepoResult<Page<User>> {
    super::user::search_in_role(conn, role_id, &Default::default(), page_id, page_size).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn add(conn: &mut SqliteConnection, name: &str, parent_id: i64) -> Role {
        create(
            conn,
            &RoleCreate {
                name: name.into(),
                parent_id,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_grand_id_chain() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let a = add(&mut conn, "A", 0).await;
        let b = add(&mut conn, "B", a.id).await;
        let c = add(&mut conn, "C", b.id).await;
        assert_eq!(a.grand_id, "");
        assert_eq!(b.grand_id, format!("|{}|", a.id));
        assert_eq!(c.grand_id, format!("|{}|{}|", a.id, b.id));
        assert_eq!(c.ancestor_ids(), vec![a.id, b.id]);

        let stored = find_by_id(&mut conn, c.id).await.unwrap().unwrap();
        assert_eq!(stored, c);
    }

    #[tokio::test]
    async fn test_missing_parent_is_treated_as_root() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let orphan = add(&mut conn, "orphan", 42).await;
        assert_eq!(orphan.parent_id, 42);
        assert_eq!(orphan.grand_id, "|42|");
    }

    #[tokio::test]
    async fn test_duplicate_names() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let a = add(&mut conn, "A", 0).await;
        add(&mut conn, "B", 0).await;

        let err = create(&mut conn, &RoleCreate { name: "A".into(), parent_id: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = rename(&mut conn, a.id, "B").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        assert_eq!(rename(&mut conn, a.id, "A").await.unwrap().name, "A");
        assert_eq!(rename(&mut conn, a.id, "Z").await.unwrap().name, "Z");
        assert!(matches!(
            rename(&mut conn, 999, "Y").await.unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_visible_roles() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let a = add(&mut conn, "A", 0).await;
        let b = add(&mut conn, "B", a.id).await;
        let c = add(&mut conn, "C", b.id).await;
        let d = add(&mut conn, "D", 0).await;

        let ids = |page: Page<Role>| page.items.into_iter().map(|r| r.id).collect::<Vec<_>>();

        let all = list_visible(&mut conn, None, 1, 10).await.unwrap();
        assert_eq!(ids(all), vec![a.id, b.id, c.id, d.id]);

        let under_b = list_visible(&mut conn, Some(&[b.id]), 1, 10).await.unwrap();
        assert_eq!(ids(under_b), vec![b.id, c.id]);

        let two = list_visible(&mut conn, Some(&[c.id, d.id]), 1, 10).await.unwrap();
        assert_eq!(ids(two), vec![c.id, d.id]);

        let none = list_visible(&mut conn, Some(&[]), 1, 10).await.unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let a = add(&mut conn, "A", 0).await;
        let b = add(&mut conn, "B", a.id).await;
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (1, ?), (1, ?)")
            .bind(a.id)
            .bind(b.id)
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO permission_roles (permission_id, role_id) VALUES (1, ?)")
            .bind(a.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        assert!(has_children(&mut conn, a.id).await.unwrap());
        assert!(!has_children(&mut conn, b.id).await.unwrap());
        assert!(delete(&mut conn, a.id).await.unwrap());

        assert!(find_by_id(&mut conn, a.id).await.unwrap().is_none());
        let orphan = find_by_id(&mut conn, b.id).await.unwrap().unwrap();
        assert_eq!(orphan.parent_id, a.id);
        assert_eq!(roles_of_user(&mut conn, 1).await.unwrap(), vec![orphan]);

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permission_roles")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
