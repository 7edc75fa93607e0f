use async_trait::async_trait;

use crate::models::user::{User, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("account already exists")]
    EmailTaken,
    #[error("user store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable email-to-account mapping. Lookups are case-insensitive on email;
/// `create_user` performs the conflict check and the append as one serialized
/// step, so two racing signups for the same email cannot both succeed.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, UserStoreError>;
}
