use serde::{Deserialize, Serialize};

use crate::models::user::{PublicUser, UserRole};

/// Cookie that carries the signed session token.
pub const SESSION_COOKIE: &str = "auth_token";
/// Fixed session time-to-live.
pub const SESSION_TTL_HOURS: i64 = 4;

/// Server-side session record, fixed at issuance from the stored account.
/// The role is never elevated after creation without a fresh login.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub exp: usize, // expiration (as UNIX timestamp)
}

impl From<&Claims> for PublicUser {
    fn from(claims: &Claims) -> Self {
        PublicUser {
            id: claims.id.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}
