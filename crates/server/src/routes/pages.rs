use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub user_id: Option<String>,
}

/// Serve `name` from the pages directory; a missing page redirects to `/404`.
async fn serve_page(state: &AppState, name: &str, req: Request) -> Response {
    match ServeFile::new(state.pages_dir.join(name)).oneshot(req).await {
        Ok(res) if res.status() == StatusCode::NOT_FOUND => Redirect::to("/404").into_response(),
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

/// Bookmark page for `?user_id=`; unknown or missing ids go to `/404`.
pub async fn index(
    State(state): State<AppState>,
    Query(q): Query<IndexQuery>,
    req: Request,
) -> Response {
    let known = match q.user_id.as_deref() {
        Some(id) if !id.is_empty() => state.store.contains(id).await,
        _ => false,
    };
    if !known {
        return Redirect::to("/404").into_response();
    }
    serve_page(&state, "index.html", req).await
}

pub async fn admin(State(state): State<AppState>, req: Request) -> Response {
    serve_page(&state, "admin.html", req).await
}

pub async fn redirect_not_found() -> Redirect {
    Redirect::to("/404")
}
