//! Durable activity persistence.
//!
//! [`ActivityPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every [`PlatformEvent`] to `activity_log`. It runs as a
//! background task and exits once the bus is dropped and drained.

use onboard_db::models::activity::NewActivity;
use onboard_db::repositories::ActivityRepo;
use onboard_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct ActivityPersistence;

impl ActivityPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist activity"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Activity persistence lagged, entries were lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Activity bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        ActivityRepo::insert(pool, &Self::to_row(event)).await?;
        Ok(())
    }

    fn to_row(event: &PlatformEvent) -> NewActivity {
        NewActivity {
            event_type: event.event_type.clone(),
            actor_user_id: event.actor_user_id,
            source_entity_type: event.source_entity_type.clone(),
            source_entity_id: event.source_entity_id,
            payload: event.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::event_types;

    #[test]
    fn row_carries_every_envelope_field() {
        let event = PlatformEvent::new(event_types::STORE_REDEEMED)
            .with_source("store_product", 3)
            .with_actor(9)
            .with_payload(serde_json::json!({"points_spent": 100}));

        let row = ActivityPersistence::to_row(&event);
        assert_eq!(row.event_type, "store.redeemed");
        assert_eq!(row.actor_user_id, Some(9));
        assert_eq!(row.source_entity_type.as_deref(), Some("store_product"));
        assert_eq!(row.source_entity_id, Some(3));
        assert_eq!(row.payload["points_spent"], 100);
    }
}
