use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{Connection, Pool, Postgres};
use std::time::Duration;
use url::Url;

pub type DbPool = Pool<Postgres>;

pub async fn init_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
    ensure_database(database_url).await?;

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .max_lifetime(Duration::from_secs(30 * 60))
        .idle_timeout(Duration::from_secs(10 * 60))
        .connect(database_url)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id SERIAL PRIMARY KEY,
            type VARCHAR(20) NOT NULL,
            content TEXT NOT NULL,
            options JSONB,
            time_limit INTEGER,
            answer_limit INTEGER,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Column added after the first release; keeps older databases usable.
    sqlx::query(
        r#"
        ALTER TABLE questions ADD COLUMN IF NOT EXISTS answer_limit INTEGER
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            id SERIAL PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'preparing',
            current_question_id INTEGER,
            groups_count INTEGER,
            groups JSONB,
            display_mode VARCHAR(20) NOT NULL DEFAULT 'none',
            started_at TIMESTAMPTZ,
            ended_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        ALTER TABLE activities ADD COLUMN IF NOT EXISTS groups_count INTEGER
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        ALTER TABLE activities ADD COLUMN IF NOT EXISTS groups JSONB
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        ALTER TABLE activities ADD COLUMN IF NOT EXISTS display_mode VARCHAR(20) NOT NULL DEFAULT 'none'
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            activity_id INTEGER REFERENCES activities(id),
            name VARCHAR(100) NOT NULL,
            group_name VARCHAR(100),
            joined_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            id SERIAL PRIMARY KEY,
            activity_id INTEGER REFERENCES activities(id),
            question_id INTEGER REFERENCES questions(id),
            user_id INTEGER REFERENCES users(id),
            answer_text TEXT,
            submitted_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_users_activity_id ON users(activity_id)
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_answers_activity_id ON answers(activity_id)
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_answers_question_user ON answers(question_id, user_id)
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

/// Create the target database through the maintenance `postgres` database
/// when the configured one does not exist yet.
async fn ensure_database(database_url: &str) -> Result<(), sqlx::Error> {
    match PgConnection::connect(database_url).await {
        Ok(conn) => {
            conn.close().await.ok();
            return Ok(());
        }
        Err(e) => {
            warn!("Could not connect to configured database: {e}");
        }
    }

    let parsed =
        Url::parse(database_url).map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
    let db_name = {
        let name = parsed.path().trim_start_matches('/');
        if name.is_empty() { "qna_db" } else { name }.to_string()
    };

    let mut admin_url = parsed.clone();
    admin_url.set_path("/postgres");

    let mut conn = PgConnection::connect(admin_url.as_str()).await?;

    let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&db_name)
        .fetch_optional(&mut conn)
        .await?;

    if exists.is_none() {
        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&mut conn)
            .await?;
        info!("Created database '{db_name}'");
    }

    conn.close().await.ok();
    Ok(())
}
