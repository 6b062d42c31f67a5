use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000, worker_threads: Some(4) }
    }
}

/// Where user data lives and where pages/assets are served from.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            static_dir: default_static_dir(),
            pages_dir: default_pages_dir(),
        }
    }
}

/// Networks (CIDR notation) allowed to open the admin page.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_allowed_networks")]
    pub allowed_networks: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { allowed_networks: default_allowed_networks() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_data_file() -> String { "data/users.json".into() }
fn default_static_dir() -> String { "static".into() }
fn default_pages_dir() -> String { "pages".into() }
fn default_allowed_networks() -> Vec<String> {
    vec!["192.168.31.0/24".into(), "127.0.0.0/8".into(), "::1/128".into()]
}

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults overridden by `SERVER_HOST`,
    /// `SERVER_PORT`, `DATA_FILE` and `TOKIO_WORKER_THREADS`.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// A file that exists but fails to read or parse is an error, never a
    /// silent fallback to defaults.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = if Path::new(path).exists() {
            load_from_file(path).with_context(|| format!("failed to load config file {path}"))?
        } else {
            Self::from_env()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(data_file) = std::env::var("DATA_FILE") {
            cfg.storage.data_file = data_file;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .or(cfg.server.worker_threads);
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.admin.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }
}

impl AdminConfig {
    /// Only checks the `address/prefix` shape; the server parses the networks for real.
    pub fn validate(&self) -> Result<()> {
        for net in &self.allowed_networks {
            let (addr, prefix) = net
                .split_once('/')
                .ok_or_else(|| anyhow!("admin.allowed_networks entry {net:?} is missing a /prefix"))?;
            if addr.trim().is_empty() || prefix.parse::<u8>().is_err() {
                return Err(anyhow!("admin.allowed_networks entry {net:?} is not valid CIDR"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempConfig(std::path::PathBuf);

    impl TempConfig {
        fn new(name: &str, content: &str) -> Self {
            let path = std::env::temp_dir().join(format!("tabdeck_cfg_{}_{name}.toml", std::process::id()));
            std::fs::write(&path, content).unwrap();
            Self(path)
        }

        fn path(&self) -> &str {
            self.0.to_str().unwrap()
        }
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn present_file_is_used() {
        let file = TempConfig::new("present", "[server]\nhost = \"127.0.0.1\"\nport = 9090\n");
        let cfg = AppConfig::load_or_env_from(file.path()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9090);
    }

    #[test]
    fn broken_file_is_an_error_not_a_fallback() {
        let file = TempConfig::new("syntax", "[admin]\nallowed_networks = [\"10.0.0.0/8\"\n");
        assert!(AppConfig::load_or_env_from(file.path()).is_err());

        let file = TempConfig::new("types", "[admin]\nallowed_networks = \"10.0.0.0/8\"\n");
        assert!(AppConfig::load_or_env_from(file.path()).is_err());

        let file = TempConfig::new("cidr", "[admin]\nallowed_networks = [\"10.0.0.0\"]\n");
        let err = AppConfig::load_or_env_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("10.0.0.0"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("tabdeck_cfg_{}_absent.toml", std::process::id()));
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        assert!(cfg.admin.allowed_networks.contains(&"127.0.0.0/8".to_string()));
        assert_eq!(cfg.server.worker_threads.map(|w| w > 0), Some(true));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let mut cfg: AppConfig = toml::from_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.data_file, "data/users.json");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(cfg.admin.allowed_networks.contains(&"192.168.31.0/24".to_string()));
        assert!(!cfg.logging.json);
    }

    #[test]
    fn parses_all_sections() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8088
            worker_threads = 0

            [storage]
            data_file = "/var/lib/tabdeck/users.json"

            [admin]
            allowed_networks = ["10.0.0.0/8"]

            [logging]
            json = true
        "#;
        let mut cfg: AppConfig = toml::from_str(raw).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.data_file, "/var/lib/tabdeck/users.json");
        assert_eq!(cfg.storage.static_dir, "static");
        assert_eq!(cfg.admin.allowed_networks, vec!["10.0.0.0/8".to_string()]);
        assert!(cfg.logging.json);
    }

    #[test]
    fn rejects_zero_port_and_bad_cidr() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.admin.allowed_networks = vec!["192.168.31.*".into()];
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.data_file = "  ".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
