//! Repository for the `activity_log` table.

use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{ActivityEntry, NewActivity};

const COLUMNS: &str =
    "id, event_type, actor_user_id, source_entity_type, source_entity_id, payload, created_at";

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn insert(pool: &PgPool, entry: &NewActivity) -> Result<ActivityEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log (event_type, actor_user_id, source_entity_type, source_entity_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityEntry>(&query)
            .bind(&entry.event_type)
            .bind(entry.actor_user_id)
            .bind(&entry.source_entity_type)
            .bind(entry.source_entity_id)
            .bind(&entry.payload)
            .fetch_one(pool)
            .await
    }

    /// Most recent entries first, optionally restricted to one event type.
    pub async fn list_recent(
        pool: &PgPool,
        event_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log
             WHERE ($1::TEXT IS NULL OR event_type = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ActivityEntry>(&query)
            .bind(event_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Entries recorded for one actor, newest first.
    pub async fn list_for_actor(
        pool: &PgPool,
        actor_user_id: DbId,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log
             WHERE actor_user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ActivityEntry>(&query)
            .bind(actor_user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
