//! Per-request authorization context
//!
//! The persisted [`User`] never carries its grants. [`CurrentUser`] pairs
//! it with an immutable [`AuthContext`] built by [`load_current_user`].

use std::collections::BTreeSet;

use shared::models::User;
use sqlx::SqliteConnection;

use crate::db::repository::RepoResult;

/// Grants of one user, resolved once per request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub is_superuser: bool,
    pub permission_set: BTreeSet<String>,
    /// Role names
    pub role_set: BTreeSet<String>,
    pub role_id_set: BTreeSet<i64>,
}

impl AuthContext {
    /// Exact name match, or superuser
    pub fn has_permission(&self, name: &str) -> bool {
        self.is_superuser || self.permission_set.contains(name)
    }
}

/// Authenticated user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub auth: AuthContext,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn is_superuser(&self) -> bool {
        self.auth.is_superuser
    }
}

#[derive(sqlx::FromRow)]
struct GrantRow {
    #[sqlx(flatten)]
    user: User,
    role_id: Option<i64>,
    role_name: Option<String>,
    permission_name: Option<String>,
}

/// User `user_id` with its roles and permissions, in a single query
pub async fn load_current_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> RepoResult<Option<CurrentUser>> {
    let rows = sqlx::query_as::<_, GrantRow>(
        "SELECT users.id, users.phone, users.password, users.is_superuser, users.create_at, \
                users.update_at, users.is_active, users.name, users.sex, users.address, \
                users.nation, users.birthday, users.user_identity, \
                roles.id AS role_id, roles.name AS role_name, permissions.name AS permission_name \
         FROM users \
         LEFT JOIN user_roles ON user_roles.user_id = users.id \
         LEFT JOIN roles ON roles.id = user_roles.role_id \
         LEFT JOIN permission_roles ON permission_roles.role_id = roles.id \
         LEFT JOIN permissions ON permissions.id = permission_roles.permission_id \
         WHERE users.id = ?",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Ok(None);
    };

    let mut auth = AuthContext {
        is_superuser: first.user.is_superuser,
        ..Default::default()
    };
    let user = first.user.clone();
    for row in std::iter::once(first).chain(rows) {
        if let Some(role_id) = row.role_id {
            auth.role_id_set.insert(role_id);
        }
        if let Some(role_name) = row.role_name {
            auth.role_set.insert(role_name);
        }
        if let Some(permission_name) = row.permission_name {
            auth.permission_set.insert(permission_name);
        }
    }

    Ok(Some(CurrentUser { user, auth }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{membership, permission, role};
    use crate::db::test_pool;
    use shared::models::RoleCreate;

    #[tokio::test]
    async fn test_load_grants() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        sqlx::query(
            "INSERT INTO users (phone, password, create_at, update_at, name) VALUES ('13218655818', 'h', 0, 0, 'u')",
        )
        .execute(&mut *conn)
        .await
        .unwrap();

        let bare = load_current_user(&mut conn, 1).await.unwrap().unwrap();
        assert_eq!(bare.auth, AuthContext::default());
        assert!(load_current_user(&mut conn, 2).await.unwrap().is_none());

        let a = role::create(&mut conn, &RoleCreate { name: "A".into(), parent_id: 0 }).await.unwrap();
        let b = role::create(&mut conn, &RoleCreate { name: "B".into(), parent_id: 0 }).await.unwrap();
        let create_user = permission::create(&mut conn, "create-user").await.unwrap();
        let manage = permission::create(&mut conn, "manage-user:1").await.unwrap();
        membership::add_users_to_role(&mut conn, a.id, &[1]).await.unwrap();
        membership::add_users_to_role(&mut conn, b.id, &[1, 1]).await.unwrap();
        membership::add_permissions_to_role(&mut conn, a.id, &[create_user.id, manage.id])
            .await
            .unwrap();

        let current = load_current_user(&mut conn, 1).await.unwrap().unwrap();
        assert_eq!(current.id(), 1);
        assert!(!current.is_superuser());
        assert_eq!(current.auth.role_id_set, BTreeSet::from([a.id, b.id]));
        assert_eq!(current.auth.role_set, BTreeSet::from(["A".to_string(), "B".to_string()]));
        assert_eq!(
            current.auth.permission_set,
            BTreeSet::from(["create-user".to_string(), "manage-user:1".to_string()])
        );
        assert!(current.auth.has_permission("create-user"));
        assert!(!current.auth.has_permission("manage-user:2"));
    }

    #[test]
    fn test_superuser_has_every_permission() {
        let auth = AuthContext {
            is_superuser: true,
            ..Default::default()
        };
        assert!(auth.has_permission("anything"));
    }
}
