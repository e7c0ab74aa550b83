use crate::db::connection::DbPool;
use crate::db::models::Activity;
use sqlx::types::Json;
use sqlx::{Error, Postgres, QueryBuilder, Row};

/// Subset of activity columns touched by the partial-update endpoint.
/// Outer `None` fields are left untouched; a nullable column set to
/// `Some(None)` is cleared to SQL NULL.
#[derive(Debug, Default)]
pub struct ActivityUpdate<'a> {
    pub status: Option<&'a str>,
    pub current_question_id: Option<Option<i32>>,
    pub groups_count: Option<Option<i32>>,
    pub groups: Option<Option<&'a [String]>>,
    pub display_mode: Option<&'a str>,
}

impl ActivityUpdate<'_> {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.current_question_id.is_none()
            && self.groups_count.is_none()
            && self.groups.is_none()
            && self.display_mode.is_none()
    }
}

pub async fn get_all_activities(pool: &DbPool) -> Result<Vec<Activity>, Error> {
    let rows = sqlx::query_as::<_, Activity>(
        r#"
        SELECT id, name, status, current_question_id, groups_count, groups,
               display_mode, started_at, ended_at, created_at
        FROM activities ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_activity(pool: &DbPool, activity_id: i32) -> Result<Option<Activity>, Error> {
    let row = sqlx::query_as::<_, Activity>(
        r#"
        SELECT id, name, status, current_question_id, groups_count, groups,
               display_mode, started_at, ended_at, created_at
        FROM activities WHERE id = $1
        "#,
    )
    .bind(activity_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn create_activity(
    pool: &DbPool,
    name: &str,
    groups_count: Option<i32>,
    groups: Option<&[String]>,
) -> Result<i32, Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO activities (name, status, groups_count, groups)
        VALUES ($1, 'preparing', $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(groups_count)
    .bind(groups.map(Json))
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn update_activity(
    pool: &DbPool,
    activity_id: i32,
    update: &ActivityUpdate<'_>,
) -> Result<(), Error> {
    if update.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE activities SET ");
    {
        let mut fields = builder.separated(", ");

        if let Some(status) = update.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status);
            if status == "active" {
                fields.push("started_at = CURRENT_TIMESTAMP");
            }
            if status == "ended" {
                fields.push("ended_at = CURRENT_TIMESTAMP");
            }
        }

        if let Some(question_id) = update.current_question_id {
            fields.push("current_question_id = ");
            fields.push_bind_unseparated(question_id);
        }

        if let Some(count) = update.groups_count {
            fields.push("groups_count = ");
            fields.push_bind_unseparated(count);
        }

        if let Some(groups) = update.groups {
            match groups {
                Some(groups) if !groups.is_empty() => {
                    fields.push("groups = ");
                    fields.push_bind_unseparated(Json(groups.to_vec()));
                    // The count follows the custom list unless set explicitly.
                    if update.groups_count.is_none() {
                        fields.push("groups_count = ");
                        fields.push_bind_unseparated(groups.len() as i32);
                    }
                }
                // Null or empty both clear the custom list.
                _ => {
                    fields.push("groups = NULL");
                }
            }
        }

        if let Some(display_mode) = update.display_mode {
            fields.push("display_mode = ");
            fields.push_bind_unseparated(display_mode);
        }
    }

    builder.push(" WHERE id = ");
    builder.push_bind(activity_id);
    builder.build().execute(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearing_a_column_is_not_an_empty_update() {
        let update = ActivityUpdate {
            current_question_id: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());

        assert!(ActivityUpdate::default().is_empty());
    }
}
