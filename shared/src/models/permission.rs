//! Permission Model

use serde::{Deserialize, Serialize};

/// Permission entity; `name` is an opaque string matched exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
}

/// Create / rename payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionInput {
    pub name: String,
}
