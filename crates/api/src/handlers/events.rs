//! Company events: public listing and registration, tickets, owner management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::company_events::{
    generate_reference_number, remaining_seats, ticket_qr_payload, validate_event,
};
use onboard_core::error::CoreError;
use onboard_core::profile::{normalize_email, validate_email};
use onboard_core::types::DbId;
use onboard_db::models::event::{
    CreateEvent, CreateParticipant, Event, EventParticipant, UpdateEvent,
};
use onboard_db::repositories::{CheckInOutcome, EventRepo, RegistrationOutcome};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::guards::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// An event with its seat availability. `remaining_seats` is `null` for
/// events without a capacity.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub remaining_seats: Option<i64>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            remaining_seats: remaining_seats(event.capacity, event.registered_count),
            event,
        }
    }
}

/// Request body for `POST /events/{id}/registrations`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub captcha_token: Option<String>,
}

/// A registration as shown to its holder.
#[derive(Debug, Serialize)]
pub struct TicketView {
    pub participant: EventParticipant,
    pub event: Event,
    /// URL encoded into the ticket's QR code.
    pub qr_payload: String,
}

/// Request body for `POST /admin/events/{id}/check-in`.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub reference_number: String,
}

#[derive(Debug, Serialize)]
pub struct CheckInResult {
    pub participant: EventParticipant,
    pub already_checked_in: bool,
}

fn ticket_view(state: &AppState, participant: EventParticipant, event: Event) -> TicketView {
    TicketView {
        qr_payload: ticket_qr_payload(&state.config.frontend_url, &participant.reference_number),
        participant,
        event,
    }
}

async fn check_captcha(state: &AppState, token: Option<&str>) -> AppResult<()> {
    if !state.captcha.is_required() {
        return Ok(());
    }
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("CAPTCHA token is required".to_string()))?;
    let passed = state.captcha.verify(token).await.map_err(|e| {
        AppError::InternalError(format!("CAPTCHA verification unavailable: {e}"))
    })?;
    if !passed {
        return Err(AppError::BadRequest("CAPTCHA verification failed".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/events
pub async fn list_published(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EventView>>>> {
    let events = EventRepo::list_published(&state.pool).await?;
    Ok(Json(DataResponse {
        data: events.into_iter().map(EventView::from).collect(),
    }))
}

/// GET /api/v1/events/{id}
///
/// Unpublished events answer 404.
pub async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventView>>> {
    let event = EventRepo::find_published(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    Ok(Json(DataResponse { data: event.into() }))
}

/// POST /api/v1/events/{id}/registrations
///
/// Anyone may register; a valid bearer token links the seat to that user.
pub async fn register(
    State(state): State<AppState>,
    maybe_auth: MaybeAuthUser,
    Path(event_id): Path<DbId>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketView>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name is required".to_string(),
        )));
    }
    validate_email(&input.email)?;
    check_captcha(&state, input.captcha_token.as_deref()).await?;

    let user_id = maybe_auth.user_id();
    let registration = CreateParticipant {
        event_id,
        user_id,
        name: name.to_string(),
        email: normalize_email(&input.email),
        reference_number: generate_reference_number(event_id),
    };

    let participant = match EventRepo::register(&state.pool, &registration).await? {
        RegistrationOutcome::Registered(participant) => participant,
        RegistrationOutcome::Rejected(rejection) => return Err(AppError::Core(rejection)),
        RegistrationOutcome::EventNotFound => return Err(AppError::not_found("Event", event_id)),
    };
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", event_id))?;

    tracing::info!(
        event_id,
        participant_id = participant.id,
        reference = %participant.reference_number,
        "Event registration"
    );
    state.publish(
        PlatformEvent::new(event_types::EVENT_REGISTERED)
            .with_source("event", event_id)
            .with_optional_actor(user_id)
            .with_payload(serde_json::json!({
                "participant_id": participant.id,
                "reference_number": participant.reference_number,
            })),
    );

    let ticket = ticket_view(&state, participant, event);
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/events/tickets/{reference}
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<DataResponse<TicketView>>> {
    let participant = EventRepo::find_participant_by_reference(&state.pool, &reference)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    let event = EventRepo::find_by_id(&state.pool, participant.event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", participant.event_id))?;
    Ok(Json(DataResponse {
        data: ticket_view(&state, participant, event),
    }))
}

// ---------------------------------------------------------------------------
// Owner endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/events
pub async fn list_events(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<EventView>>>> {
    let events = EventRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse {
        data: events.into_iter().map(EventView::from).collect(),
    }))
}

/// GET /api/v1/admin/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventView>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    Ok(Json(DataResponse { data: event.into() }))
}

/// POST /api/v1/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<EventView>>)> {
    validate_event(&input.title, input.starts_at, input.ends_at, input.capacity)?;
    let event = EventRepo::create(&state.pool, &input, owner.user_id).await?;
    tracing::info!(event_id = event.id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event.into() })))
}

/// PUT /api/v1/admin/events/{id}
///
/// The merged result is validated, so moving `starts_at` past an existing
/// `ends_at` is rejected.
pub async fn update_event(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<DataResponse<EventView>>> {
    let current = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    validate_event(
        input.title.as_deref().unwrap_or(&current.title),
        input.starts_at.unwrap_or(current.starts_at),
        input.ends_at.or(current.ends_at),
        input.capacity.unwrap_or(current.capacity),
    )?;

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    Ok(Json(DataResponse { data: event.into() }))
}

/// DELETE /api/v1/admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Event", id));
    }
    tracing::info!(event_id = id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/events/{id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EventParticipant>>>> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    let participants = EventRepo::list_participants(&state.pool, id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// POST /api/v1/admin/events/{id}/check-in
///
/// Repeating a check-in is not an error; the first timestamp is kept.
pub async fn check_in(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<Json<DataResponse<CheckInResult>>> {
    let reference = input.reference_number.trim();
    let result = match EventRepo::check_in(&state.pool, id, reference).await? {
        CheckInOutcome::CheckedIn(participant) => CheckInResult {
            participant,
            already_checked_in: false,
        },
        CheckInOutcome::AlreadyCheckedIn(participant) => CheckInResult {
            participant,
            already_checked_in: true,
        },
        CheckInOutcome::NotFound => return Err(AppError::Database(sqlx::Error::RowNotFound)),
    };
    tracing::info!(
        event_id = id,
        participant_id = result.participant.id,
        already = result.already_checked_in,
        "Participant checked in"
    );
    Ok(Json(DataResponse { data: result }))
}
