//! Company event and participant models.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// An event row with its current registration count.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub capacity: Option<i32>,
    pub is_published: bool,
    pub registration_open: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub registered_count: i64,
}

/// DTO for creating an event.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default = "default_registration_open")]
    pub registration_open: bool,
}

fn default_registration_open() -> bool {
    true
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// DTO for updating an event. All fields are optional. `capacity` is
/// `Some(None)` when the body sends `"capacity": null`, which makes the event
/// unlimited again.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "present")]
    pub capacity: Option<Option<i32>>,
    pub is_published: Option<bool>,
    pub registration_open: Option<bool>,
}

/// A row from the `event_participants` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct EventParticipant {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub email: String,
    pub reference_number: String,
    pub checked_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for a registration row. The reference number is generated by the
/// caller.
#[derive(Debug)]
pub struct CreateParticipant {
    pub event_id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub email: String,
    pub reference_number: String,
}
