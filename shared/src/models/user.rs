//! User Model

use crate::constants::Sex;
use serde::{Deserialize, Serialize};

/// User row
///
/// `password` holds an Argon2 PHC string and is never serialized.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_superuser: bool,
    pub create_at: i64,
    pub update_at: i64,
    pub is_active: bool,
    pub name: String,
    pub sex: Option<i64>,
    pub address: String,
    pub nation: Option<i64>,
    pub birthday: Option<i64>,
    /// Bitmask of `UserIdentity` flags
    pub user_identity: i64,
}

/// Compact user view used in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBrief {
    pub id: i64,
    pub name: String,
    pub sex: Option<i64>,
    pub phone: String,
    pub user_identity: i64,
}

/// Full user view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: i64,
    pub name: String,
    pub sex: Option<i64>,
    pub phone: String,
    pub user_identity: i64,
    pub address: String,
    pub nation: Option<i64>,
    pub birthday: Option<i64>,
}

impl From<&User> for UserBrief {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            sex: u.sex,
            phone: u.phone.clone(),
            user_identity: u.user_identity,
        }
    }
}

impl From<&User> for UserDetail {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            sex: u.sex,
            phone: u.phone.clone(),
            user_identity: u.user_identity,
            address: u.address.clone(),
            nation: u.nation,
            birthday: u.birthday,
        }
    }
}

/// Self registration / manager creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub sex: Sex,
    pub phone: String,
    /// Managers may leave it empty
    #[serde(default)]
    pub password: String,
}

/// Self update payload; every field is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub address: String,
    pub phone: String,
    pub sex: Sex,
    pub nation: Option<i64>,
    pub birthday: Option<i64>,
}

/// Manager update payload; like [`UserUpdate`] plus the name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedUserUpdate {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub phone: String,
    pub sex: Sex,
    pub nation: Option<i64>,
    pub birthday: Option<i64>,
}

impl ManagedUserUpdate {
    /// Split into the new name and the self-update part
    pub fn into_parts(self) -> (String, UserUpdate) {
        (
            self.name,
            UserUpdate {
                address: self.address,
                phone: self.phone,
                sex: self.sex,
                nation: self.nation,
                birthday: self.birthday,
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Login answer: the user detail plus the issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserDetail,
    pub user_token: String,
}
