//! Owner-authored dynamic checklists, their items, and user assignments.

use chrono::NaiveDate;
use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `dynamic_checklists` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct DynamicChecklist {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a checklist.
#[derive(Debug, Deserialize)]
pub struct CreateDynamicChecklist {
    pub title: String,
    pub description: Option<String>,
}

/// DTO for updating a checklist. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateDynamicChecklist {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A row from the `dynamic_checklist_items` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct ChecklistItem {
    pub id: DbId,
    pub checklist_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding an item. `order_index` defaults to the end of the list.
#[derive(Debug, Deserialize)]
pub struct CreateChecklistItem {
    pub title: String,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

/// DTO for updating an item. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateChecklistItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

/// A row from the `checklist_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct ChecklistAssignment {
    pub id: DbId,
    pub checklist_id: DbId,
    pub user_id: DbId,
    pub is_required: bool,
    pub due_date: Option<NaiveDate>,
    pub assigned_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for assigning a checklist to a user.
#[derive(Debug, Deserialize)]
pub struct CreateAssignment {
    pub user_id: DbId,
    #[serde(default = "default_required")]
    pub is_required: bool,
    pub due_date: Option<NaiveDate>,
}

fn default_required() -> bool {
    true
}

/// An assignment joined with checklist title, assignee and item counts.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct AssignmentSummary {
    pub id: DbId,
    pub checklist_id: DbId,
    pub checklist_title: String,
    pub user_id: DbId,
    pub github_username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_required: bool,
    pub due_date: Option<NaiveDate>,
    pub completed_items: i64,
    pub total_items: i64,
    pub created_at: Timestamp,
}

/// One item of an assignment with its completion state.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct AssignmentItemStatus {
    pub item_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
}
