use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::types::chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: String,
    pub content: String,
    pub options: Option<Json<Vec<Value>>>,
    pub time_limit: Option<i32>,
    pub answer_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub current_question_id: Option<i32>,
    pub groups_count: Option<i32>,
    pub groups: Option<Json<Vec<String>>>,
    pub display_mode: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub activity_id: Option<i32>,
    pub name: String,
    pub group_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Answer {
    pub id: i32,
    pub activity_id: Option<i32>,
    pub question_id: Option<i32>,
    pub user_id: Option<i32>,
    pub answer_text: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Answer row joined with the answering user, as returned by the activity
/// detail endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnswerWithUser {
    pub id: i32,
    pub activity_id: Option<i32>,
    pub question_id: Option<i32>,
    pub user_id: Option<i32>,
    pub answer_text: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub user_name: String,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserStat {
    pub id: i32,
    pub name: String,
    pub group_name: Option<String>,
    pub answer_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupStat {
    pub group_name: String,
    pub member_count: i64,
    pub total_answers: i64,
    pub avg_answers_per_person: f64,
}
