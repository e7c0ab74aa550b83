use crate::db::connection::DbPool;
use crate::db::models::{Answer, AnswerWithUser, GroupStat, UserStat};
use sqlx::Error;
use sqlx::Row;

pub async fn create_answer(
    pool: &DbPool,
    activity_id: i32,
    question_id: i32,
    user_id: i32,
    answer_text: &str,
) -> Result<i32, Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO answers (activity_id, question_id, user_id, answer_text)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(activity_id)
    .bind(question_id)
    .bind(user_id)
    .bind(answer_text)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn get_answers_for_question_user(
    pool: &DbPool,
    question_id: i32,
    user_id: i32,
) -> Result<Vec<Answer>, Error> {
    let rows = sqlx::query_as::<_, Answer>(
        r#"
        SELECT id, activity_id, question_id, user_id, answer_text, submitted_at
        FROM answers
        WHERE question_id = $1 AND user_id = $2
        ORDER BY submitted_at DESC
        "#,
    )
    .bind(question_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_recent_answers(pool: &DbPool, limit: i64) -> Result<Vec<Answer>, Error> {
    let rows = sqlx::query_as::<_, Answer>(
        r#"
        SELECT id, activity_id, question_id, user_id, answer_text, submitted_at
        FROM answers ORDER BY submitted_at DESC LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_answers_for_user(
    pool: &DbPool,
    question_id: i32,
    user_id: i32,
) -> Result<i64, Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE question_id = $1 AND user_id = $2")
            .bind(question_id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

pub async fn count_answers_for_activity(pool: &DbPool, activity_id: i32) -> Result<i64, Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE activity_id = $1")
        .bind(activity_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn get_answers_with_users(
    pool: &DbPool,
    activity_id: i32,
) -> Result<Vec<AnswerWithUser>, Error> {
    let rows = sqlx::query_as::<_, AnswerWithUser>(
        r#"
        SELECT a.id, a.activity_id, a.question_id, a.user_id, a.answer_text, a.submitted_at,
               u.name AS user_name, u.group_name
        FROM answers a
        JOIN users u ON a.user_id = u.id
        WHERE a.activity_id = $1
        ORDER BY a.question_id, a.submitted_at DESC
        "#,
    )
    .bind(activity_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Per-user answer counts for the current question, for the horizontal
/// bar chart on the display screen.
pub async fn get_user_stats(
    pool: &DbPool,
    activity_id: i32,
    question_id: i32,
) -> Result<Vec<UserStat>, Error> {
    let rows = sqlx::query_as::<_, UserStat>(
        r#"
        SELECT u.id, u.name, u.group_name, COUNT(a.id) AS answer_count
        FROM users u
        LEFT JOIN answers a ON a.user_id = u.id AND a.question_id = $1 AND a.activity_id = $2
        WHERE u.activity_id = $2
        GROUP BY u.id, u.name, u.group_name
        ORDER BY answer_count DESC, u.name
        "#,
    )
    .bind(question_id)
    .bind(activity_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Per-group average answers-per-member for the current question, for the
/// vertical bar chart. Users without a group fall into an `Ungrouped` bucket.
pub async fn get_group_stats(
    pool: &DbPool,
    activity_id: i32,
    question_id: i32,
) -> Result<Vec<GroupStat>, Error> {
    let rows = sqlx::query_as::<_, GroupStat>(
        r#"
        SELECT
            COALESCE(u.group_name, 'Ungrouped') AS group_name,
            COUNT(DISTINCT u.id) AS member_count,
            COUNT(a.id) AS total_answers,
            CASE
                WHEN COUNT(DISTINCT u.id) > 0
                THEN ROUND(COUNT(a.id)::numeric / COUNT(DISTINCT u.id), 2)::float8
                ELSE 0::float8
            END AS avg_answers_per_person
        FROM users u
        LEFT JOIN answers a ON a.user_id = u.id AND a.question_id = $1 AND a.activity_id = $2
        WHERE u.activity_id = $2
        GROUP BY COALESCE(u.group_name, 'Ungrouped')
        ORDER BY group_name
        "#,
    )
    .bind(question_id)
    .bind(activity_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
