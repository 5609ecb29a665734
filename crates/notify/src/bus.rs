//! Portal activity feed.
//!
//! Handlers describe what happened as a [`PlatformEvent`] and hand it to the
//! shared [`EventBus`] once their write has committed. Delivery is a
//! `tokio::sync::broadcast` fan-out, so publishing never waits on a
//! subscriber and a request never fails because nobody is listening.

use chrono::{DateTime, Utc};
use onboard_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Names of the activities the portal records.
pub mod event_types {
    pub const USER_PROVISIONED: &str = "user.provisioned";
    pub const USER_SIGNED_IN: &str = "user.signed_in";
    pub const EMAIL_VERIFIED: &str = "email.verified";
    pub const ONBOARDING_COMPLETED: &str = "onboarding.completed";
    pub const TICKET_CREATED: &str = "ticket.created";
    pub const TICKET_RESOLVED: &str = "ticket.resolved";
    pub const STORE_REDEEMED: &str = "store.redeemed";
    pub const POINTS_ADJUSTED: &str = "points.adjusted";
    pub const EVENT_REGISTERED: &str = "event.registered";
    pub const FORM_SUBMITTED: &str = "form.submitted";
    pub const LANDING_ACTIVATED: &str = "landing.activated";
}

/// One entry of the activity feed, shaped like an `activity_log` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub event_type: String,
    /// Kind of record the activity is about (`"ticket"`, `"store_product"`).
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// `None` for anonymous public actions such as guest event registration.
    pub actor_user_id: Option<DbId>,
    /// Always a JSON object.
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: Value::Object(Map::new()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        Self {
            source_entity_type: Some(entity_type.into()),
            source_entity_id: Some(entity_id),
            ..self
        }
    }

    pub fn with_actor(self, user_id: DbId) -> Self {
        self.with_optional_actor(Some(user_id))
    }

    pub fn with_optional_actor(self, actor_user_id: Option<DbId>) -> Self {
        Self {
            actor_user_id,
            ..self
        }
    }

    /// Non-object payloads are wrapped as `{"value": ...}` so the stored
    /// column stays an object.
    pub fn with_payload(self, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(_) => payload,
            other => serde_json::json!({ "value": other }),
        };
        Self { payload, ..self }
    }
}

/// Events a subscriber may fall behind by before it starts losing the oldest.
const FEED_BUFFER: usize = 1024;

/// Shared through `Arc<EventBus>`; every subscriber sees every event.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// A subscriber more than `capacity` events behind gets
    /// `RecvError::Lagged` and skips ahead.
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity).0,
        }
    }

    /// Returns how many subscribers the event reached; zero is not an error.
    pub fn publish(&self, event: PlatformEvent) -> usize {
        let event_type = event.event_type.clone();
        let reached = self.sender.send(event).unwrap_or(0);
        tracing::debug!(%event_type, reached, "Activity published");
        reached
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(FEED_BUFFER)
    }
}
