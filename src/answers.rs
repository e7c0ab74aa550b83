use crate::db;
use crate::error::ApiError;
use crate::startup::AppState;
use crate::ws::models::ServerEvent;
use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct AnswerQuery {
    pub question_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub activity_id: i32,
    pub question_id: i32,
    pub user_id: i32,
    pub answer_text: String,
}

/// A user's answers to a question (clients use this to check how many
/// submissions they have left); without filters, the most recent 100.
pub async fn list_answers(
    Extension(app_state): Extension<AppState>,
    Query(query): Query<AnswerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let answers = match (query.question_id, query.user_id) {
        (Some(question_id), Some(user_id)) => {
            db::get_answers_for_question_user(&app_state.db, question_id, user_id).await?
        }
        _ => db::get_recent_answers(&app_state.db, 100).await?,
    };

    Ok((StatusCode::OK, Json(answers)))
}

/// Submit an answer, enforcing the question's per-user answer limit.
pub async fn submit_answer(
    Extension(app_state): Extension<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = db::get_question(&app_state.db, payload.question_id)
        .await?
        .ok_or(ApiError::QuestionNotFound)?;

    // Rows written before limits were normalized may still hold 0;
    // only positive limits are enforced.
    if let Some(limit) = crate::questions::normalize_answer_limit(question.answer_limit) {
        let submitted =
            db::count_answers_for_user(&app_state.db, payload.question_id, payload.user_id)
                .await?;
        if submitted >= limit as i64 {
            return Err(ApiError::AnswerLimitExceeded(limit));
        }
    }

    let answer_id = db::create_answer(
        &app_state.db,
        payload.activity_id,
        payload.question_id,
        payload.user_id,
        &payload.answer_text,
    )
    .await?;

    app_state.broadcast(ServerEvent::AnswerSubmitted {
        activity_id: payload.activity_id,
        question_id: payload.question_id,
    });
    Ok((StatusCode::CREATED, Json(json!({ "id": answer_id }))))
}
