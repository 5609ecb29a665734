//! Monthly performance goal model and DTOs.

use onboard_core::performance::GoalChecklistItem;
use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A goal row joined with the assignee's identity.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct PerformanceGoal {
    pub id: DbId,
    pub user_id: DbId,
    pub month_year: String,
    pub target_hours: f64,
    pub completed_hours: f64,
    pub target_story_points: f64,
    pub completed_story_points: f64,
    /// JSON array of `{ title, completed }` entries.
    pub checklist: serde_json::Value,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub github_username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// DTO for creating a goal.
#[derive(Debug, Deserialize)]
pub struct CreateGoal {
    pub user_id: DbId,
    pub month_year: String,
    #[serde(default)]
    pub target_hours: f64,
    #[serde(default)]
    pub completed_hours: f64,
    #[serde(default)]
    pub target_story_points: f64,
    #[serde(default)]
    pub completed_story_points: f64,
    #[serde(default)]
    pub checklist: Vec<GoalChecklistItem>,
    pub notes: Option<String>,
}

/// DTO for updating a goal. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoal {
    pub target_hours: Option<f64>,
    pub completed_hours: Option<f64>,
    pub target_story_points: Option<f64>,
    pub completed_story_points: Option<f64>,
    pub checklist: Option<Vec<GoalChecklistItem>>,
    pub notes: Option<String>,
}

/// Filters for goal listings.
#[derive(Debug, Default, Deserialize)]
pub struct GoalFilter {
    pub user_id: Option<DbId>,
    pub month_year: Option<String>,
}
