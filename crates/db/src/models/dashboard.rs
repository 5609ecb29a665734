//! Owner dashboard aggregates.

use serde::Serialize;
use sqlx::FromRow;
use ts_rs::TS;

/// Headline counts shown on the owner dashboard.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub total_users: i64,
    pub verified_users: i64,
    pub onboarded_users: i64,
    pub open_tickets: i64,
    pub upcoming_events: i64,
    pub active_products: i64,
    pub pending_assignments: i64,
}
