//! Static onboarding steps and per-user completion.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `onboarding_steps` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct OnboardingStep {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An active step joined with one user's completion flag.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct UserStepStatus {
    pub step_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub order_index: i32,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
}

/// DTO for creating a step. `order_index` defaults to the end of the list.
#[derive(Debug, Deserialize)]
pub struct CreateOnboardingStep {
    pub title: String,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub order_index: Option<i32>,
}

/// DTO for updating a step. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateOnboardingStep {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub order_index: Option<i32>,
    pub is_active: Option<bool>,
}
