use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::user::{User, UserRole};

use super::user_store::{UserStore, UserStoreError};

/// Flat-file account store: one JSON array, read in full and rewritten in
/// full on every mutation. Mutations serialize through `write_lock`, held
/// across the whole load-modify-save sequence, so interleaved signups cannot
/// lose each other's writes.
pub struct JsonUserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonUserStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<User>, UserStoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // First access: initialize the backing file to an empty collection.
                self.save(&[]).await?;
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, users: &[User]) -> Result<(), UserStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(users)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let users = self.load().await?;
        Ok(users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, UserStoreError> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.load().await?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(UserStoreError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        self.save(&users).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn temp_store() -> JsonUserStore {
        let path = std::env::temp_dir().join(format!("users-{}.json", Uuid::new_v4()));
        JsonUserStore::new(path)
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_store() {
        let store = temp_store();
        let found = store.find_by_email("nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn create_then_find_is_case_insensitive() {
        let store = temp_store();
        store
            .create_user("a@x.com", "hash", UserRole::User)
            .await
            .unwrap();

        let found = store.find_by_email("A@X.COM").await.unwrap().unwrap();
        assert_eq!(found.email, "a@x.com");
        assert_eq!(found.role, UserRole::User);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_regardless_of_case() {
        let store = temp_store();
        store
            .create_user("a@x.com", "hash", UserRole::User)
            .await
            .unwrap();

        let err = store
            .create_user("A@X.com", "hash2", UserRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, UserStoreError::EmailTaken));
    }

    #[tokio::test]
    async fn records_survive_a_second_store_on_the_same_file() {
        let path = std::env::temp_dir().join(format!("users-{}.json", Uuid::new_v4()));
        let first = JsonUserStore::new(&path);
        first
            .create_user("a@x.com", "hash", UserRole::Admin)
            .await
            .unwrap();

        let second = JsonUserStore::new(&path);
        let found = second.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn concurrent_signups_for_same_email_resolve_to_one_winner() {
        let store = Arc::new(temp_store());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.create_user("race@x.com", "h1", UserRole::User).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.create_user("race@x.com", "h2", UserRole::User).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(matches!(
            a.err().or(b.err()),
            Some(UserStoreError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn concurrent_signups_for_distinct_emails_both_persist() {
        let store = Arc::new(temp_store());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.create_user("one@x.com", "h1", UserRole::User).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.create_user("two@x.com", "h2", UserRole::User).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert!(store.find_by_email("one@x.com").await.unwrap().is_some());
        assert!(store.find_by_email("two@x.com").await.unwrap().is_some());
    }
}
