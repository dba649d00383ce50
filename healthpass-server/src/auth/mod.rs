//! Authentication and authorization
//!
//! - [`JwtService`]: token codec
//! - [`CurrentUser`] / [`AuthContext`]: the actor of a request and its grants
//! - [`require_auth`], [`require_superuser`], [`require_permission`]: guards
//! - [`permissions`]: registry and management predicates

pub mod context;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;

pub use context::{AuthContext, CurrentUser, load_current_user};
pub use jwt::{Claims, JwtError, JwtService};
pub use middleware::{TOKEN_COOKIE, require_auth, require_permission, require_superuser};
pub use password::{hash_password, verify_password};
pub use rate_limit::{RateLimiter, login_rate_limit};
