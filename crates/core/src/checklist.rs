//! Onboarding step and dynamic checklist helpers.

use serde::Serialize;

use crate::error::CoreError;

pub const MAX_ITEM_TITLE_LENGTH: usize = 200;

/// Completion summary for a set of checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChecklistProgress {
    pub completed: i64,
    pub total: i64,
    pub percentage: f64,
    pub is_complete: bool,
}

impl ChecklistProgress {
    /// Summarize `completed` out of `total` items.
    ///
    /// An empty checklist counts as complete so it never blocks onboarding.
    pub fn new(completed: i64, total: i64) -> Self {
        let completed = completed.clamp(0, total.max(0));
        let percentage = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            100.0
        };
        Self {
            completed,
            total,
            percentage,
            is_complete: completed >= total,
        }
    }
}

/// Validate the title of an onboarding step, dynamic checklist or item.
pub fn validate_item_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_ITEM_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_ITEM_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}
