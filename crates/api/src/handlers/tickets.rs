//! Support tickets: users file and follow their own, owners triage all.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use onboard_core::tickets;
use onboard_core::types::DbId;
use onboard_db::models::ticket::{CreateTicket, Ticket, TicketFilter, UpdateTicket};
use onboard_db::repositories::TicketRepo;
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::guards::RequireOwner;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/tickets`.
#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `PUT /admin/tickets/{id}`. Omitted fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub resolution_notes: Option<String>,
}

// ---------------------------------------------------------------------------
// User endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateTicket>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    tickets::validate_ticket_text(&input.title, &input.description)?;
    tickets::validate_category(&input.category)?;
    if let Some(priority) = input.priority.as_deref() {
        tickets::validate_priority(priority)?;
    }

    let ticket = TicketRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(ticket_id = ticket.id, user_id = auth.user_id, "Ticket created");
    state.publish(
        PlatformEvent::new(event_types::TICKET_CREATED)
            .with_source("ticket", ticket.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "category": ticket.category,
                "priority": ticket.priority,
            })),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets
pub async fn list_own_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let tickets = TicketRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
///
/// Tickets of other users answer 404.
pub async fn get_own_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|t| t.user_id == auth.user_id)
        .ok_or_else(|| AppError::not_found("Ticket", id))?;
    Ok(Json(DataResponse { data: ticket }))
}

// ---------------------------------------------------------------------------
// Owner endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<TicketListParams>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    if let Some(status) = params.status.as_deref() {
        tickets::validate_status(status)?;
    }
    if let Some(category) = params.category.as_deref() {
        tickets::validate_category(category)?;
    }
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let filter = TicketFilter {
        status: params.status,
        category: params.category,
        user_id: params.user_id,
    };
    let tickets = TicketRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/admin/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", id))?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PUT /api/v1/admin/tickets/{id}
///
/// Entering `resolved` or `closed` stamps `resolved_at` once; moving back to
/// an active status clears it.
pub async fn update_ticket(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTicketRequest>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let current = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", id))?;

    let status = input.status.unwrap_or_else(|| current.status.clone());
    let priority = input.priority.unwrap_or_else(|| current.priority.clone());
    tickets::validate_status(&status)?;
    tickets::validate_priority(&priority)?;

    let resolved_at = tickets::resolved_at_after(&status, current.resolved_at, Utc::now());
    let update = UpdateTicket {
        status,
        priority,
        resolution_notes: input.resolution_notes,
        resolved_at,
    };
    let ticket = TicketRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", id))?;

    tracing::info!(ticket_id = id, status = %ticket.status, "Ticket updated");
    if tickets::is_terminal(&ticket.status) && !tickets::is_terminal(&current.status) {
        state.publish(
            PlatformEvent::new(event_types::TICKET_RESOLVED)
                .with_source("ticket", ticket.id)
                .with_actor(owner.user_id)
                .with_payload(serde_json::json!({
                    "status": ticket.status,
                    "requester_id": ticket.user_id,
                })),
        );
    }
    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/admin/tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TicketRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Ticket", id));
    }
    tracing::info!(ticket_id = id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}
