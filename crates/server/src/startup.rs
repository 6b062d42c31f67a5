use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, ServerConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;
use service::{runtime, user_store::UserStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Build the app from an already validated config and run the HTTP server.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let storage = &cfg.storage;
    runtime::ensure_env(&storage.static_dir, &storage.pages_dir, &storage.data_file).await?;

    let store = UserStore::open_file(&storage.data_file).await?;
    let users = store.list_user_ids().await.len();
    info!(data_file = %storage.data_file, users, "user store ready");

    let state = AppState::from_config(store, &cfg)?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting tabdeck server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() {
        let server = ServerConfig { host: "127.0.0.1".into(), port: 5000, worker_threads: None };
        assert_eq!(bind_addr(&server).unwrap(), "127.0.0.1:5000".parse::<SocketAddr>().unwrap());

        let bad = ServerConfig { host: "not a host".into(), port: 5000, worker_threads: None };
        assert!(bind_addr(&bad).is_err());
    }
}
