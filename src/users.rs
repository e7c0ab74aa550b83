use crate::db;
use crate::error::ApiError;
use crate::startup::AppState;
use crate::ws::models::ServerEvent;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct JoinActivityRequest {
    pub activity_id: i32,
    pub name: String,
    pub group_name: Option<String>,
}

/// Register a participant for an activity. This is the endpoint the HTTP
/// load harness hammers.
pub async fn join_activity(
    Extension(app_state): Extension<AppState>,
    Json(payload): Json<JoinActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest);
    }

    let user_id = db::create_user(
        &app_state.db,
        payload.activity_id,
        &payload.name,
        payload.group_name.as_deref(),
    )
    .await?;

    app_state.broadcast(ServerEvent::UserJoined {
        activity_id: payload.activity_id,
        user_id,
    });
    Ok((StatusCode::CREATED, Json(json!({ "id": user_id }))))
}
