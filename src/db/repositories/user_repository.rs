use crate::db::connection::DbPool;
use crate::db::models::User;
use sqlx::Error;
use sqlx::Row;

pub async fn create_user(
    pool: &DbPool,
    activity_id: i32,
    name: &str,
    group_name: Option<&str>,
) -> Result<i32, Error> {
    let row = sqlx::query(
        "INSERT INTO users (activity_id, name, group_name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(activity_id)
    .bind(name)
    .bind(group_name)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn get_users_for_activity(pool: &DbPool, activity_id: i32) -> Result<Vec<User>, Error> {
    let rows = sqlx::query_as::<_, User>(
        "SELECT id, activity_id, name, group_name, joined_at FROM users WHERE activity_id = $1 ORDER BY joined_at",
    )
    .bind(activity_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_users_for_activity(pool: &DbPool, activity_id: i32) -> Result<i64, Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE activity_id = $1")
        .bind(activity_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
