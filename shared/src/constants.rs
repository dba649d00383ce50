//! Fixed enumerations shared by the server and its clients
//!
//! Each enum serializes as its integer code. `*_map()` functions produce the
//! `code -> NAME` tables served by the constants endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permission name template granting management over users of a role
pub const MANAGE_USER_PERMISSION: &str = "manage-user:{role_id}";

/// Password assigned when a manager resets a user's password
pub const DEFAULT_RESET_PASSWORD: &str = "123456789";

/// Error raised when an integer has no matching constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {value}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: i64,
}

macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident = $value:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "i64", try_from = "i64")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(&self) -> i64 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub const fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl TryFrom<i64> for $name {
            type Error = UnknownCode;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(UnknownCode { kind: $kind, value }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

int_enum! {
    Sex, "sex" {
        Male = 1 => "MALE",
        Female = 2 => "FEMALE",
    }
}

int_enum! {
    /// Health code color reported on a declaration form
    HealthCodeStatus, "health code" {
        Green = 1 => "GREEN",
        Yellow = 2 => "YELLOW",
        Orange = 3 => "ORANGE",
        Red = 4 => "RED",
        Unsigned = 5 => "UNSIGNED",
    }
}

int_enum! {
    PermissionType, "permission type" {
        Common = 1 => "COMMON",
        CollegeManage = 2 => "COLLEGE_MANAGE",
    }
}

/// Bits of `user.user_identity`
///
/// Every flag is a power of two; `COMMON_USER` is the empty mask.
pub struct UserIdentity;

impl UserIdentity {
    pub const COMMON_USER: i64 = 0;
    /// Held by every user that belongs to at least one role
    pub const ADMIN: i64 = 1;

    pub const ALL: &'static [(i64, &'static str)] =
        &[(Self::COMMON_USER, "COMMON_USER"), (Self::ADMIN, "ADMIN")];
}

fn labels<T: Copy>(all: &[T], code: impl Fn(&T) -> i64, label: impl Fn(&T) -> &'static str) -> BTreeMap<i64, &'static str> {
    all.iter().map(|v| (code(v), label(v))).collect()
}

pub fn sex_map() -> BTreeMap<i64, &'static str> {
    labels(Sex::ALL, Sex::code, Sex::label)
}

pub fn health_code_map() -> BTreeMap<i64, &'static str> {
    labels(HealthCodeStatus::ALL, HealthCodeStatus::code, HealthCodeStatus::label)
}

pub fn permission_type_map() -> BTreeMap<i64, &'static str> {
    labels(PermissionType::ALL, PermissionType::code, PermissionType::label)
}

pub fn user_identity_map() -> BTreeMap<i64, &'static str> {
    UserIdentity::ALL.iter().copied().collect()
}
