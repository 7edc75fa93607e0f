#![allow(dead_code)]
use std::io::ErrorKind;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{User, UserRole};

use super::user_store::{UserStore, UserStoreError};

/// In-memory stand-in for the file store, with the same conflict semantics.
#[derive(Default)]
pub struct MockUserStore {
    pub users: Mutex<Vec<User>>,
    pub should_fail: bool,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self {
            users: Mutex::new(vec![user]),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }
}

fn mock_io_failure() -> UserStoreError {
    UserStoreError::Io(std::io::Error::new(ErrorKind::Other, "mock store failure"))
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        if self.should_fail {
            return Err(mock_io_failure());
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, UserStoreError> {
        if self.should_fail {
            return Err(mock_io_failure());
        }
        let mut users = self.users.lock().unwrap();
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
        Ok(user)
    }
}
