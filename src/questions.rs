use crate::db;
use crate::error::ApiError;
use crate::startup::AppState;
use crate::ws::models::ServerEvent;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct QuestionPayload {
    #[serde(rename = "type")]
    pub question_type: String,
    pub content: String,
    /// Options are opaque JSON: multiple-choice questions send plain strings,
    /// richer clients may send structured objects.
    #[serde(default)]
    pub options: Vec<Value>,
    pub time_limit: Option<i32>,
    pub answer_limit: Option<i32>,
}

/// Admin clients send 0 (or leave the field blank) to mean "no limit";
/// store that as NULL so enforcement only kicks in for positive limits.
pub(crate) fn normalize_answer_limit(limit: Option<i32>) -> Option<i32> {
    limit.filter(|l| *l > 0)
}

/// Get all questions, newest first.
pub async fn list_questions(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let questions = db::get_all_questions(&app_state.db).await?;
    Ok((StatusCode::OK, Json(questions)))
}

/// Create a question and announce it to connected clients.
pub async fn create_question(
    Extension(app_state): Extension<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.question_type.is_empty() || payload.content.is_empty() {
        return Err(ApiError::InvalidRequest);
    }

    let question_id = db::create_question(
        &app_state.db,
        &payload.question_type,
        &payload.content,
        &payload.options,
        payload.time_limit,
        normalize_answer_limit(payload.answer_limit),
    )
    .await?;

    app_state.broadcast(ServerEvent::QuestionCreated { id: question_id });
    Ok((StatusCode::CREATED, Json(json!({ "id": question_id }))))
}

pub async fn update_question(
    Extension(app_state): Extension<AppState>,
    Path(question_id): Path<i32>,
    Json(payload): Json<QuestionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.question_type.is_empty() || payload.content.is_empty() {
        return Err(ApiError::InvalidRequest);
    }

    db::update_question(
        &app_state.db,
        question_id,
        &payload.question_type,
        &payload.content,
        &payload.options,
        payload.time_limit,
        normalize_answer_limit(payload.answer_limit),
    )
    .await?;

    app_state.broadcast(ServerEvent::QuestionUpdated { id: question_id });
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub async fn delete_question(
    Extension(app_state): Extension<AppState>,
    Path(question_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    db::delete_question(&app_state.db, question_id).await?;

    app_state.broadcast(ServerEvent::QuestionDeleted { id: question_id });
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
