//! Role Model
//!
//! Roles form a tree. Ancestry is stored denormalized in `grand_id` as
//! `|root|...|parent|`, fixed when the role is created.

use serde::{Deserialize, Serialize};

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    /// 0 for a root role
    pub parent_id: i64,
    /// Strict ancestors, root first; empty for a root role
    pub grand_id: String,
}

impl Role {
    /// Ids of all strict ancestors, root first
    ///
    /// Empty and non-numeric tokens are skipped.
    pub fn ancestor_ids(&self) -> Vec<i64> {
        parse_grand_id(&self.grand_id)
    }

    /// Whether `role_id` is a strict ancestor of this role
    pub fn has_ancestor(&self, role_id: i64) -> bool {
        self.ancestor_ids().contains(&role_id)
    }
}

/// Split a `|a|b|` path into ids
pub fn parse_grand_id(grand_id: &str) -> Vec<i64> {
    grand_id
        .split('|')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// `grand_id` of a new child of `parent_id`
///
/// `parent_grand_id` is the parent's stored path, empty when the parent is a
/// root role or missing.
pub fn child_grand_id(parent_id: i64, parent_grand_id: &str) -> String {
    if parent_id == 0 {
        String::new()
    } else if parent_grand_id.is_empty() {
        format!("|{parent_id}|")
    } else {
        format!("{parent_grand_id}{parent_id}|")
    }
}

/// `LIKE` pattern matching every role below `role_id`
pub fn descendant_pattern(role_id: i64) -> String {
    format!("%|{role_id}|%")
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    #[serde(default)]
    pub parent_id: i64,
}

/// Rename payload; other fields of the role are immutable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub name: String,
}
