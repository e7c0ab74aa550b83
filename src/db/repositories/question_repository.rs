use crate::db::connection::DbPool;
use crate::db::models::Question;
use serde_json::Value;
use sqlx::Error;
use sqlx::Row;
use sqlx::types::Json;

pub async fn get_all_questions(pool: &DbPool) -> Result<Vec<Question>, Error> {
    let rows = sqlx::query_as::<_, Question>(
        "SELECT id, type, content, options, time_limit, answer_limit, created_at FROM questions ORDER BY created_at DESC"
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_question(pool: &DbPool, question_id: i32) -> Result<Option<Question>, Error> {
    let row = sqlx::query_as::<_, Question>(
        "SELECT id, type, content, options, time_limit, answer_limit, created_at FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn create_question(
    pool: &DbPool,
    question_type: &str,
    content: &str,
    options: &[Value],
    time_limit: Option<i32>,
    answer_limit: Option<i32>,
) -> Result<i32, Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO questions (type, content, options, time_limit, answer_limit)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(question_type)
    .bind(content)
    .bind(Json(options))
    .bind(time_limit)
    .bind(answer_limit)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn update_question(
    pool: &DbPool,
    question_id: i32,
    question_type: &str,
    content: &str,
    options: &[Value],
    time_limit: Option<i32>,
    answer_limit: Option<i32>,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        UPDATE questions
        SET type = $1, content = $2, options = $3, time_limit = $4, answer_limit = $5
        WHERE id = $6
        "#,
    )
    .bind(question_type)
    .bind(content)
    .bind(Json(options))
    .bind(time_limit)
    .bind(answer_limit)
    .bind(question_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_question(pool: &DbPool, question_id: i32) -> Result<(), Error> {
    sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(question_id)
        .execute(pool)
        .await?;

    Ok(())
}
