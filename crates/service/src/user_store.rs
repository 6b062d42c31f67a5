use std::{path::PathBuf, sync::Arc};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bookmarks::{validation::parse_record_update, UserMap, UserRecord};
use crate::errors::ServiceError;
use crate::storage::{JsonFileBackend, MemoryBackend, UserMapBackend};

/// Per-user bookmark store.
///
/// Every operation re-reads the full map from the backend; writes rewrite it.
/// Writers are serialised by `write_lock` so two read-modify-write cycles in
/// this process cannot interleave. Readers never take the lock.
pub struct UserStore {
    backend: Arc<dyn UserMapBackend>,
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(backend: Arc<dyn UserMapBackend>) -> Arc<Self> {
        Arc::new(Self { backend, write_lock: Mutex::new(()) })
    }

    /// Store persisted to a JSON file at `path`.
    pub async fn open_file<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let backend = JsonFileBackend::new(path).await?;
        Ok(Self::new(backend))
    }

    /// Store kept entirely in memory.
    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Full mapping, freshly read.
    pub async fn load(&self) -> UserMap {
        self.backend.load().await
    }

    /// Overwrite the full mapping.
    pub async fn save(&self, users: &UserMap) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        self.backend.save(users).await
    }

    /// Record for `user_id`, or the empty record for unknown users. Never writes.
    pub async fn get(&self, user_id: &str) -> UserRecord {
        self.load().await.shift_remove(user_id).unwrap_or_else(UserRecord::empty)
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.load().await.contains_key(user_id)
    }

    /// Validate `candidate` and, if it passes, replace the user's folders and
    /// search engine. The user entry is created when missing.
    pub async fn validate_and_save(&self, user_id: &str, candidate: &Value) -> Result<(), ServiceError> {
        let update = parse_record_update(candidate)?;
        let folder_count = update.folders.len();
        self.update_map(|users| {
            users.entry(user_id.to_string()).or_default().apply(update);
            Ok(())
        })
        .await?;
        debug!(%user_id, folders = folder_count, "user data saved");
        Ok(())
    }

    /// User ids in stored order.
    pub async fn list_user_ids(&self) -> Vec<String> {
        self.load().await.into_keys().collect()
    }

    pub async fn add_user(&self, user_id: &str) -> Result<(), ServiceError> {
        if user_id.is_empty() {
            return Err(ServiceError::MissingId);
        }
        self.update_map(|users| {
            if users.contains_key(user_id) {
                return Err(ServiceError::DuplicateUser);
            }
            users.insert(user_id.to_string(), UserRecord::empty());
            Ok(())
        })
        .await?;
        info!(%user_id, event = "user_added", "user added");
        Ok(())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ServiceError> {
        self.update_map(|users| {
            users.shift_remove(user_id).map(|_| ()).ok_or(ServiceError::UserNotFound)
        })
        .await?;
        info!(%user_id, event = "user_deleted", "user deleted");
        Ok(())
    }

    /// Load, apply `f`, persist. Nothing is written when `f` fails or the
    /// stored map cannot be read.
    async fn update_map<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut UserMap) -> Result<(), ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut users = self.backend.load_for_update().await?;
        f(&mut users)?;
        self.backend.save(&users).await
    }
}
