//! Storage abstractions for the user map.
//!
//! The store never keeps state of its own between operations: every call
//! loads the whole map from a backend and writes the whole map back.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;

use crate::bookmarks::UserMap;
use crate::errors::ServiceError;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// Where the user map lives. Implementations can be file-backed or in memory.
#[async_trait]
pub trait UserMapBackend: Send + Sync {
    /// Read the full map. Unreadable or malformed storage yields an empty map.
    async fn load(&self) -> UserMap;
    /// Read the full map ahead of a rewrite.
    ///
    /// Unlike `load`, storage that exists but cannot be read as a user map is
    /// an error here, so a write never replaces it with a near-empty map.
    async fn load_for_update(&self) -> Result<UserMap, ServiceError> {
        Ok(self.load().await)
    }
    /// Replace the stored map with `users`.
    async fn save(&self, users: &UserMap) -> Result<(), ServiceError>;
}
