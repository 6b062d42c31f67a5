pub mod pages;
pub mod users;

use axum::{
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::access;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: JSON API, pages, static assets.
///
/// The admin page reads the peer address, so serve the router with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Missing assets get the same /404 redirect as unknown routes.
    let static_dir = ServeDir::new(state.static_dir.as_path())
        .fallback(pages::redirect_not_found.into_service());
    let select_user_page = ServeFile::new(state.pages_dir.join("select_user.html"));
    let not_found_page = ServeFile::new(state.pages_dir.join("404.html"));

    // User data + user management
    let api = Router::new()
        .route("/get_data/:user_id", get(users::get_data))
        .route("/save_data/:user_id", post(users::save_data))
        .route("/get_users", get(users::get_users))
        .route("/add_user", post(users::add_user))
        .route("/delete_user/:user_id", delete(users::delete_user));

    // Admin page, local network only
    let admin = Router::new()
        .route("/admin", get(pages::admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access::require_admin_network,
        ));

    // Public pages + assets
    let public = Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health))
        .route_service("/select_user", select_user_page)
        .route_service("/404", not_found_page)
        .nest_service("/static", static_dir);

    public
        .merge(api)
        .merge(admin)
        .fallback(pages::redirect_not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
