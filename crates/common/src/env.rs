//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when asset directories are missing; create the directory that will hold the data file.
pub async fn ensure_env(static_dir: &str, pages_dir: &str, data_file: &str) -> anyhow::Result<()> {
    for (kind, dir) in [("static", static_dir), ("pages", pages_dir)] {
        if tokio::fs::metadata(dir).await.is_err() {
            warn!(%dir, kind, "asset directory not found; requests for it will 404");
        }
    }
    if let Some(data_dir) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}
