use crate::db::{self, ActivityUpdate};
use crate::error::ApiError;
use crate::startup::AppState;
use crate::ws::models::ServerEvent;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use qrcode::{QrCode, render::svg};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub groups_count: Option<i32>,
    pub groups: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// `Some(None)` means the key was sent as JSON null, which clears the
    /// column; an absent key leaves it untouched.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub current_question_id: Option<Option<i32>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub groups_count: Option<Option<i32>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub groups: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    /// Forwarded over WebSocket only, never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_answer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_limit: Option<i64>,
}

/// Wraps the usual `Option` deserialization so a present-but-null key
/// stays distinguishable from an absent one.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct ActivityDetailResponse {
    #[serde(flatten)]
    pub activity: db::Activity,
    pub users: Vec<db::User>,
    pub answers: Vec<db::AnswerWithUser>,
}

#[derive(Debug, Serialize)]
pub struct ActivityStatsResponse {
    pub user_count: i64,
    pub answer_count: i64,
    pub current_question_id: Option<i32>,
    pub user_stats: Vec<db::UserStat>,
    pub group_stats: Vec<db::GroupStat>,
}

/// Get all activities, newest first.
pub async fn list_activities(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = db::get_all_activities(&app_state.db).await?;
    Ok((StatusCode::OK, Json(activities)))
}

/// Create an activity in the `preparing` state.
pub async fn create_activity(
    Extension(app_state): Extension<AppState>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::InvalidRequest);
    }

    let groups = payload.groups.as_deref().filter(|g| !g.is_empty());
    let groups_count = payload
        .groups_count
        .or_else(|| groups.map(|g| g.len() as i32));

    let activity_id =
        db::create_activity(&app_state.db, &payload.name, groups_count, groups).await?;

    app_state.broadcast(ServerEvent::ActivityCreated { id: activity_id });
    Ok((StatusCode::CREATED, Json(json!({ "id": activity_id }))))
}

/// Activity detail: the row itself plus registered users and every answer
/// joined with the answering user.
pub async fn get_activity(
    Extension(app_state): Extension<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = db::get_activity(&app_state.db, activity_id)
        .await?
        .ok_or(ApiError::ActivityNotFound)?;

    let users = db::get_users_for_activity(&app_state.db, activity_id).await?;
    let answers = db::get_answers_with_users(&app_state.db, activity_id).await?;

    Ok((
        StatusCode::OK,
        Json(ActivityDetailResponse {
            activity,
            users,
            answers,
        }),
    ))
}

/// Partial update of an activity. Always broadcasts `activity_updated`;
/// display-mode changes (and activations with a current question) additionally
/// broadcast `display_update` for the projector screen.
pub async fn update_activity(
    Extension(app_state): Extension<AppState>,
    Path(activity_id): Path<i32>,
    Json(payload): Json<UpdateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = ActivityUpdate {
        status: payload.status.as_deref(),
        current_question_id: payload.current_question_id,
        groups_count: payload.groups_count,
        groups: payload.groups.as_ref().map(|inner| inner.as_deref()),
        display_mode: payload.display_mode.as_deref(),
    };
    db::update_activity(&app_state.db, activity_id, &update).await?;

    app_state.broadcast(ServerEvent::ActivityUpdated {
        activity_id,
        updates: serde_json::to_value(&payload)?,
    });

    if let Some(display_mode) = &payload.display_mode {
        app_state.broadcast(ServerEvent::DisplayUpdate {
            activity_id,
            display_mode: display_mode.clone(),
            answer: payload.projected_answer.clone(),
            stats_limit: payload.stats_limit,
        });
    } else if payload.status.as_deref() == Some("active")
        && matches!(payload.current_question_id, Some(Some(_)))
    {
        // A question just went live without an explicit mode change; tell the
        // display what the activity currently wants rendered.
        if let Some(activity) = db::get_activity(&app_state.db, activity_id).await? {
            let display_mode = if activity.display_mode.is_empty() {
                "question".to_string()
            } else {
                activity.display_mode
            };
            app_state.broadcast(ServerEvent::DisplayUpdate {
                activity_id,
                display_mode,
                answer: None,
                stats_limit: None,
            });
        }
    }

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

/// Aggregated per-user and per-group answer counts for the current question.
pub async fn get_activity_stats(
    Extension(app_state): Extension<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = db::get_activity(&app_state.db, activity_id)
        .await?
        .ok_or(ApiError::ActivityNotFound)?;

    let user_count = db::count_users_for_activity(&app_state.db, activity_id).await?;
    let answer_count = db::count_answers_for_activity(&app_state.db, activity_id).await?;

    let (user_stats, group_stats) = match activity.current_question_id {
        Some(question_id) => (
            db::get_user_stats(&app_state.db, activity_id, question_id).await?,
            db::get_group_stats(&app_state.db, activity_id, question_id).await?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok((
        StatusCode::OK,
        Json(ActivityStatsResponse {
            user_count,
            answer_count,
            current_question_id: activity.current_question_id,
            user_stats,
            group_stats,
        }),
    ))
}

/// QR code for the participant join link, as an SVG data URL.
pub async fn get_activity_qrcode(
    Extension(app_state): Extension<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/?activity={}", app_state.public_url, activity_id);

    let code = QrCode::new(url.as_bytes()).map_err(|e| ApiError::Internal(e.to_string()))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .build();
    let encoded = STANDARD.encode(image.as_bytes());

    Ok((
        StatusCode::OK,
        Json(json!({
            "qrcode": format!("data:image/svg+xml;base64,{encoded}"),
            "url": url
        })),
    ))
}

/// Joinable group names for an activity: the custom list when set, otherwise
/// generated from the configured count.
pub async fn get_activity_groups(
    Extension(app_state): Extension<AppState>,
    Path(activity_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = db::get_activity(&app_state.db, activity_id)
        .await?
        .ok_or(ApiError::ActivityNotFound)?;

    let custom = activity.groups.as_ref().map(|g| g.0.as_slice());
    let groups = resolve_group_list(custom, activity.groups_count);

    Ok((
        StatusCode::OK,
        Json(json!({
            "groups": groups,
            "groups_count": activity.groups_count
        })),
    ))
}

fn resolve_group_list(custom: Option<&[String]>, groups_count: Option<i32>) -> Vec<String> {
    if let Some(groups) = custom {
        if !groups.is_empty() {
            return groups.to_vec();
        }
    }
    match groups_count {
        Some(count) if count > 0 => generate_group_names(count),
        _ => Vec::new(),
    }
}

fn generate_group_names(count: i32) -> Vec<String> {
    (1..=count).map(|i| format!("Group {i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_numbered_group_names() {
        assert_eq!(generate_group_names(3), vec!["Group 1", "Group 2", "Group 3"]);
    }

    #[test]
    fn custom_group_names_win_over_count() {
        let custom = vec!["Red".to_string(), "Blue".to_string()];
        assert_eq!(
            resolve_group_list(Some(&custom), Some(5)),
            vec!["Red", "Blue"]
        );
    }

    #[test]
    fn empty_custom_list_falls_back_to_count() {
        assert_eq!(resolve_group_list(Some(&[]), Some(2)).len(), 2);
        assert!(resolve_group_list(Some(&[]), None).is_empty());
    }

    #[test]
    fn null_update_fields_are_distinguished_from_absent() {
        let cleared: UpdateActivityRequest = serde_json::from_value(json!({
            "current_question_id": null,
            "groups": null
        }))
        .unwrap();
        assert_eq!(cleared.current_question_id, Some(None));
        assert_eq!(cleared.groups, Some(None));
        assert_eq!(cleared.groups_count, None);

        let untouched: UpdateActivityRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(untouched.current_question_id, None);
        assert_eq!(untouched.groups, None);
    }

    #[test]
    fn cleared_fields_survive_the_broadcast_payload() {
        let payload: UpdateActivityRequest = serde_json::from_value(json!({
            "status": "active",
            "current_question_id": null
        }))
        .unwrap();
        let updates = serde_json::to_value(&payload).unwrap();
        assert_eq!(updates, json!({ "status": "active", "current_question_id": null }));
    }
}
