//! Permission registry and management predicates
//!
//! Permission names are opaque strings matched exactly. There are no
//! wildcards; the superuser bypasses every check.

use shared::constants::MANAGE_USER_PERMISSION;
use shared::models::Role;
use sqlx::SqliteConnection;

use super::context::CurrentUser;
use crate::db::repository::{RepoResult, membership};
use crate::security_log;

/// Granted to create users through the manager endpoint
pub const CREATE_USER: &str = "create-user";

/// Every permission name a route checks, printed by `permission list`
pub const KNOWN_PERMISSIONS: &[&str] = &[MANAGE_USER_PERMISSION, CREATE_USER];

/// `manage-user:{role_id}` for a concrete role
pub fn manage_user_permission(role_id: i64) -> String {
    MANAGE_USER_PERMISSION.replace("{role_id}", &role_id.to_string())
}

/// Whether `actor` administers `role`: it holds the role itself or one of
/// its ancestors
pub fn can_manage_role(role: &Role, actor: &CurrentUser) -> bool {
    if actor.is_superuser() {
        return true;
    }
    let role_ids = &actor.auth.role_id_set;
    role_ids.contains(&role.id) || role.ancestor_ids().iter().any(|id| role_ids.contains(id))
}

/// Templated check against the target's role ids
///
/// Passes when the actor holds `manage-user:{rid}` for any role of the target.
/// A target without roles can only be managed by the superuser.
pub fn can_manage_user(actor: &CurrentUser, target_id: i64, target_role_ids: &[i64]) -> bool {
    if actor.is_superuser() {
        return true;
    }
    let allowed = target_role_ids
        .iter()
        .any(|rid| actor.auth.permission_set.contains(&manage_user_permission(*rid)));
    if !allowed {
        security_log!(
            "WARN",
            "manage_user_denied",
            user_id = actor.id(),
            target_id = target_id
        );
    }
    allowed
}

/// Batch form of [`can_manage_user`], all or nothing
///
/// Unknown ids are dropped. Returns `(true, existing ids)` when every existing
/// target passes, `(false, [])` at the first failure.
pub async fn can_manage_user_ids(
    conn: &mut SqliteConnection,
    actor: &CurrentUser,
    user_ids: &[i64],
) -> RepoResult<(bool, Vec<i64>)> {
    let targets = membership::role_ids_of_users(conn, user_ids).await?;
    if actor.is_superuser() {
        return Ok((true, targets.into_keys().collect()));
    }
    for (user_id, role_ids) in &targets {
        if !can_manage_user(actor, *user_id, role_ids) {
            return Ok((false, Vec::new()));
        }
    }
    Ok((true, targets.into_keys().collect()))
}

/// Single-target form; a missing user is never manageable
pub async fn can_manage_user_id(
    conn: &mut SqliteConnection,
    actor: &CurrentUser,
    user_id: i64,
) -> RepoResult<bool> {
    let (allowed, ids) = can_manage_user_ids(conn, actor, &[user_id]).await?;
    Ok(allowed && ids == [user_id])
}
