use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Activity not found")]
    ActivityNotFound,
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Answer limit for this question reached ({0})")]
    AnswerLimitExceeded(i32),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::InvalidRequest => (StatusCode::BAD_REQUEST, "Invalid request".to_string()),
            ApiError::ActivityNotFound => (StatusCode::NOT_FOUND, "Activity not found".to_string()),
            ApiError::QuestionNotFound => (StatusCode::NOT_FOUND, "Question not found".to_string()),
            ApiError::AnswerLimitExceeded(limit) => (
                StatusCode::BAD_REQUEST,
                format!("Answer limit for this question reached ({limit})"),
            ),
            ApiError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let mut body = json!({
            "error": error_message,
            "details": self.to_string()
        });
        if matches!(self, ApiError::AnswerLimitExceeded(_)) {
            body["error_code"] = json!("ANSWER_LIMIT_EXCEEDED");
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_limit_maps_to_bad_request() {
        let response = ApiError::AnswerLimitExceeded(3).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_activity_maps_to_not_found() {
        let response = ApiError::ActivityNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
