//! Persisted platform activity.

use onboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `activity_log` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct ActivityEntry {
    pub id: DbId,
    pub event_type: String,
    pub actor_user_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for recording an activity entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub event_type: String,
    pub actor_user_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub payload: serde_json::Value,
}
