//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Warn on missing asset directories and create the data directory.
pub async fn ensure_env(static_dir: &str, pages_dir: &str, data_file: &str) -> anyhow::Result<()> {
    common::env::ensure_env(static_dir, pages_dir, data_file).await
}
