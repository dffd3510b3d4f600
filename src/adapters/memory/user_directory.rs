//! In-memory implementation of UserDirectory.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::UserDirectory;

/// In-memory `UserDirectory` implementation.
pub struct InMemoryUserDirectory {
    users: Mutex<HashSet<UserId>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashSet::new()),
        }
    }

    /// Register a known user.
    pub fn insert(&self, user_id: UserId) {
        self.users.lock().unwrap().insert(user_id);
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.users.lock().unwrap().contains(user_id))
    }
}
