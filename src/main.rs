use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use qna_backend::{activities, answers, config::Config, db, questions, startup::AppState, users, ws};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

async fn index() -> impl IntoResponse {
    axum::Json(json!({ "service": "qna_backend", "status": "ok" }))
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "INFO");
        }
    }
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::load();

    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialise database");
    let app_state = AppState::new(db, &config);

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::ws_handler))
        .route(
            "/api/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/api/questions/:question_id",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route(
            "/api/activities",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route(
            "/api/activities/:activity_id",
            get(activities::get_activity).put(activities::update_activity),
        )
        .route(
            "/api/activities/:activity_id/stats",
            get(activities::get_activity_stats),
        )
        .route(
            "/api/activities/:activity_id/qrcode",
            get(activities::get_activity_qrcode),
        )
        .route(
            "/api/activities/:activity_id/groups",
            get(activities::get_activity_groups),
        )
        .route("/api/users", post(users::join_activity))
        .route(
            "/api/answers",
            get(answers::list_answers).post(answers::submit_answer),
        )
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .fallback(handler_404);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Unable to spawn tcp listener");

    axum::serve(listener, app).await.unwrap();
}
