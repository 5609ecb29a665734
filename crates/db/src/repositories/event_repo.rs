//! Repository for company events and their participants.

use onboard_core::company_events::check_registration;
use onboard_core::error::CoreError;
use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, CreateParticipant, Event, EventParticipant, UpdateEvent};

const SELECT: &str = "SELECT e.id, e.title, e.description, e.location, e.starts_at, e.ends_at,
            e.capacity, e.is_published, e.registration_open, e.created_by,
            e.created_at, e.updated_at,
            (SELECT COUNT(*) FROM event_participants p WHERE p.event_id = e.id) AS registered_count
     FROM events e";

const PARTICIPANT_COLUMNS: &str =
    "id, event_id, user_id, name, email, reference_number, checked_in_at, created_at";

/// Outcome of a registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(EventParticipant),
    /// The event exists but refused the registration.
    Rejected(CoreError),
    EventNotFound,
}

/// Outcome of a check-in attempt.
#[derive(Debug)]
pub enum CheckInOutcome {
    CheckedIn(EventParticipant),
    AlreadyCheckedIn(EventParticipant),
    NotFound,
}

pub struct EventRepo;

impl EventRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateEvent,
        created_by: DbId,
    ) -> Result<Event, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO events (title, description, location, starts_at, ends_at, capacity,
                                 is_published, registration_open, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.capacity.is_some())
        .bind(input.capacity)
        .bind(input.is_published)
        .bind(input.registration_open)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("{SELECT} WHERE e.id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A published event, or `None` for drafts and missing ids.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("{SELECT} WHERE e.id = $1 AND e.is_published");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Published events that have not ended, soonest first.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE e.is_published AND COALESCE(e.ends_at, e.starts_at) >= NOW()
             ORDER BY e.starts_at, e.id"
        );
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// Every event including drafts, newest start first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("{SELECT} ORDER BY e.starts_at DESC, e.id DESC");
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                capacity = CASE WHEN $7 THEN $8 ELSE capacity END,
                is_published = COALESCE($9, is_published),
                registration_open = COALESCE($10, registration_open)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.capacity.is_some())
        .bind(input.capacity.flatten())
        .bind(input.is_published)
        .bind(input.registration_open)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Participants
    // -----------------------------------------------------------------------

    /// Register a participant.
    ///
    /// The event row is locked for the duration of the transaction so that
    /// concurrent registrations cannot overshoot `capacity`. A second
    /// registration with the same email violates
    /// `uq_event_participants_event_email`.
    pub async fn register(
        pool: &PgPool,
        input: &CreateParticipant,
    ) -> Result<RegistrationOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event: Option<(bool, bool, Option<i32>)> = sqlx::query_as(
            "SELECT is_published, registration_open, capacity
             FROM events WHERE id = $1
             FOR UPDATE",
        )
        .bind(input.event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((is_published, registration_open, capacity)) = event else {
            tx.rollback().await?;
            return Ok(RegistrationOutcome::EventNotFound);
        };

        let registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_participants WHERE event_id = $1")
                .bind(input.event_id)
                .fetch_one(&mut *tx)
                .await?;

        if let Err(rejection) =
            check_registration(is_published, registration_open, capacity, registered)
        {
            tx.rollback().await?;
            return Ok(RegistrationOutcome::Rejected(rejection));
        }

        let query = format!(
            "INSERT INTO event_participants (event_id, user_id, name, email, reference_number)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PARTICIPANT_COLUMNS}"
        );
        let participant = sqlx::query_as::<_, EventParticipant>(&query)
            .bind(input.event_id)
            .bind(input.user_id)
            .bind(input.name.trim())
            .bind(&input.email)
            .bind(&input.reference_number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RegistrationOutcome::Registered(participant))
    }

    pub async fn find_participant_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<EventParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE reference_number = $1"
        );
        sqlx::query_as::<_, EventParticipant>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_participants(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants
             WHERE event_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, EventParticipant>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Check in the holder of `reference` at `event_id`. The first check-in
    /// time is kept.
    pub async fn check_in(
        pool: &PgPool,
        event_id: DbId,
        reference: &str,
    ) -> Result<CheckInOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE event_participants SET checked_in_at = NOW()
             WHERE reference_number = $2 AND event_id = $1 AND checked_in_at IS NULL
             RETURNING {PARTICIPANT_COLUMNS}"
        );
        let checked_in = sqlx::query_as::<_, EventParticipant>(&query)
            .bind(event_id)
            .bind(reference)
            .fetch_optional(pool)
            .await?;
        if let Some(participant) = checked_in {
            return Ok(CheckInOutcome::CheckedIn(participant));
        }

        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants
             WHERE reference_number = $2 AND event_id = $1"
        );
        let existing = sqlx::query_as::<_, EventParticipant>(&query)
            .bind(event_id)
            .bind(reference)
            .fetch_optional(pool)
            .await?;
        Ok(match existing {
            Some(participant) => CheckInOutcome::AlreadyCheckedIn(participant),
            None => CheckInOutcome::NotFound,
        })
    }
}
