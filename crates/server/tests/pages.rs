use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use service::user_store::UserStore;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::access::NetworkAllowList;
use server::routes;
use server::state::AppState;

struct Site {
    root: PathBuf,
    store: std::sync::Arc<UserStore>,
}

impl Drop for Site {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn site() -> anyhow::Result<Site> {
    let root = std::env::temp_dir().join(format!("tabdeck_site_{}", Uuid::new_v4()));
    let pages = root.join("pages");
    let assets = root.join("static").join("js");
    std::fs::create_dir_all(&pages)?;
    std::fs::create_dir_all(&assets)?;
    for name in ["index", "admin", "select_user", "404"] {
        std::fs::write(pages.join(format!("{name}.html")), format!("<h1>{name}</h1>"))?;
    }
    std::fs::write(assets.join("common.js"), "console.log('hi');")?;
    Ok(Site { root, store: UserStore::in_memory() })
}

fn router(site: &Site, peer: [u8; 4]) -> Router {
    let networks = NetworkAllowList::from_cidrs(["192.168.31.0/24"]).unwrap();
    let state = AppState::new(site.store.clone(), site.root.join("pages"), site.root.join("static"), networks);
    routes::build_router(state, CorsLayer::very_permissive())
        .layer(MockConnectInfo(SocketAddr::from((peer, 50000))))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let res = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn index_requires_known_user() -> anyhow::Result<()> {
    let site = site()?;
    site.store.add_user("alice").await?;
    let local = [192, 168, 31, 5];

    let (status, location, _) = get(router(&site, local), "/").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));

    let (status, location, _) = get(router(&site, local), "/?user_id=").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));

    let (status, location, _) = get(router(&site, local), "/?user_id=mallory").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));

    let (status, _, body) = get(router(&site, local), "/?user_id=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>index</h1>");
    Ok(())
}

#[tokio::test]
async fn admin_page_is_limited_to_allowed_network() -> anyhow::Result<()> {
    let site = site()?;

    let (status, _, body) = get(router(&site, [192, 168, 31, 77]), "/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>admin</h1>");

    let (status, _, body) = get(router(&site, [192, 168, 1, 77]), "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("local network only"));

    let (status, _, _) = get(router(&site, [8, 8, 8, 8]), "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn fixed_pages_and_static_assets() -> anyhow::Result<()> {
    let site = site()?;
    let peer = [10, 0, 0, 2];

    let (status, _, body) = get(router(&site, peer), "/select_user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>select_user</h1>");

    let (status, _, body) = get(router(&site, peer), "/404").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>404</h1>");

    let (status, _, body) = get(router(&site, peer), "/static/js/common.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log('hi');");

    let (status, location, _) = get(router(&site, peer), "/static/js/missing.js").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));
    Ok(())
}

#[tokio::test]
async fn missing_page_files_redirect_to_not_found_page() -> anyhow::Result<()> {
    let site = site()?;
    site.store.add_user("alice").await?;
    std::fs::remove_file(site.root.join("pages").join("index.html"))?;
    std::fs::remove_file(site.root.join("pages").join("admin.html"))?;

    let (status, location, _) = get(router(&site, [10, 0, 0, 2]), "/?user_id=alice").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));

    let (status, location, _) = get(router(&site, [192, 168, 31, 5]), "/admin").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));
    Ok(())
}

#[tokio::test]
async fn unknown_routes_redirect_to_not_found_page() -> anyhow::Result<()> {
    let site = site()?;
    let (status, location, _) = get(router(&site, [10, 0, 0, 2]), "/no/such/page").await;
    assert!(status.is_redirection());
    assert_eq!(location.as_deref(), Some("/404"));
    Ok(())
}
