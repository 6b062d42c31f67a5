use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, warn};

use super::UserMapBackend;
use crate::bookmarks::{UserMap, UserRecord};
use crate::errors::ServiceError;

/// JSON file holding the whole user map, pretty-printed.
///
/// Writes go to a sibling `*.tmp` file which is then renamed over the target,
/// so a concurrent reader sees either the old or the new document.
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    file_path: PathBuf,
}

impl JsonFileBackend {
    /// Prepare a backend for `path`, creating its parent directory if needed.
    /// The file itself is created lazily on the first save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::persistence)?;
        }
        Ok(Arc::new(Self { file_path }))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    /// Absent file is an empty map; an unreadable file or a document that is
    /// not a JSON object is an error. Individual records that do not decode
    /// are salvaged rather than dropping the whole document.
    async fn read_users(&self) -> Result<UserMap, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "user data file absent; starting empty");
                return Ok(UserMap::new());
            }
            Err(e) => return Err(ServiceError::persistence(e)),
        };
        let raw: IndexMap<String, Value> = serde_json::from_slice(&bytes).map_err(ServiceError::persistence)?;
        let users = raw
            .into_iter()
            .map(|(user_id, value)| {
                let record = UserRecord::deserialize(&value).unwrap_or_else(|e| {
                    warn!(%user_id, error = %e, "stored record is malformed; keeping readable parts");
                    UserRecord::salvage(value)
                });
                (user_id, record)
            })
            .collect();
        Ok(users)
    }
}

#[async_trait]
impl UserMapBackend for JsonFileBackend {
    async fn load(&self) -> UserMap {
        self.read_users().await.unwrap_or_else(|e| {
            warn!(path = %self.file_path.display(), error = %e, "user data file unreadable; treating as empty");
            UserMap::new()
        })
    }

    async fn load_for_update(&self) -> Result<UserMap, ServiceError> {
        self.read_users().await.map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "refusing to overwrite unreadable user data file");
            e
        })
    }

    async fn save(&self, users: &UserMap) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(users).map_err(ServiceError::persistence)?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &data).await {
            error!(path = %tmp.display(), error = %e, "failed to write user data");
            return Err(ServiceError::persistence(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            error!(path = %self.file_path.display(), error = %e, "failed to replace user data file");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence(e));
        }
        Ok(())
    }
}
