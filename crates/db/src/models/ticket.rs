//! Support ticket model and DTOs.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A ticket joined with the requester's identity.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct Ticket {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub requester_username: String,
    pub requester_first_name: Option<String>,
    pub requester_last_name: Option<String>,
}

/// DTO for a user-submitted ticket.
#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<String>,
}

/// Owner-side update. `resolved_at` is computed by the caller.
#[derive(Debug)]
pub struct UpdateTicket {
    pub status: String,
    pub priority: String,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<Timestamp>,
}

/// Filters for the owner ticket list.
#[derive(Debug, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<DbId>,
}
