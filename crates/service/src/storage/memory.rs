use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserMapBackend;
use crate::bookmarks::UserMap;
use crate::errors::ServiceError;

/// In-memory backend for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    users: RwLock<UserMap>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: UserMap) -> Self {
        Self { users: RwLock::new(users), fail_writes: AtomicBool::new(false) }
    }

    /// Make every subsequent `save` fail with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> UserMap {
        self.users.read().await.clone()
    }
}

#[async_trait]
impl UserMapBackend for MemoryBackend {
    async fn load(&self) -> UserMap {
        self.users.read().await.clone()
    }

    async fn save(&self, users: &UserMap) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::persistence("memory backend configured to fail writes"));
        }
        *self.users.write().await = users.clone();
        Ok(())
    }
}
