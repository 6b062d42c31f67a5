use std::{path::PathBuf, sync::Arc};

use configs::AppConfig;
use service::user_store::UserStore;

use crate::access::NetworkAllowList;
use crate::errors::StartupError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub pages_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
    pub admin_networks: Arc<NetworkAllowList>,
}

impl AppState {
    pub fn new(
        store: Arc<UserStore>,
        pages_dir: impl Into<PathBuf>,
        static_dir: impl Into<PathBuf>,
        admin_networks: NetworkAllowList,
    ) -> Self {
        Self {
            store,
            pages_dir: Arc::new(pages_dir.into()),
            static_dir: Arc::new(static_dir.into()),
            admin_networks: Arc::new(admin_networks),
        }
    }

    pub fn from_config(store: Arc<UserStore>, cfg: &AppConfig) -> Result<Self, StartupError> {
        let networks = NetworkAllowList::from_cidrs(&cfg.admin.allowed_networks)
            .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
        Ok(Self::new(store, &cfg.storage.pages_dir, &cfg.storage.static_dir, networks))
    }
}
