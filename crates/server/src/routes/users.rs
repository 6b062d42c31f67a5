use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use service::{bookmarks::UserRecord, errors::ServiceError};

use common::types::StatusBody;

use crate::errors::ApiError;
use crate::state::AppState;

// Bodies are parsed by hand so a missing or wrong content type still
// yields the `{"error": ...}` contract instead of an axum rejection.
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError(ServiceError::InvalidFormat))
}

/// Saved folders and search engine; unknown users get an empty record.
pub async fn get_data(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<UserRecord> {
    Json(state.store.get(&user_id).await)
}

pub async fn save_data(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<StatusBody>, ApiError> {
    let candidate = parse_body(&body)?;
    state.store.validate_and_save(&user_id, &candidate).await?;
    Ok(Json(StatusBody::success()))
}

pub async fn get_users(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.list_user_ids().await)
}

/// Body: `{"id": "<user id>"}`.
pub async fn add_user(State(state): State<AppState>, body: Bytes) -> Result<Json<StatusBody>, ApiError> {
    let payload = parse_body(&body)?;
    let user_id = payload.get("id").and_then(Value::as_str).unwrap_or_default();
    state.store.add_user(user_id).await?;
    Ok(Json(StatusBody::success()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatusBody>, ApiError> {
    state.store.delete_user(&user_id).await?;
    Ok(Json(StatusBody::success()))
}
