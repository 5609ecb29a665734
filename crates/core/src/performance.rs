//! Monthly performance goal math.
//!
//! A goal tracks hours and story points against monthly targets. The
//! completion percentage averages the per-dimension ratios, skipping any
//! dimension without a positive target. Values are not clamped, so
//! over-achievement reports more than 100.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single entry of the checklist embedded in a performance goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalChecklistItem {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Maximum number of checklist entries stored on one goal.
pub const MAX_GOAL_CHECKLIST_ITEMS: usize = 50;

/// Compute the completion percentage of a goal.
///
/// Returns `0.0` when both targets are zero (or negative). Otherwise returns
/// the mean of `done / target * 100` over the dimensions whose target is
/// positive.
pub fn calculate_performance_percentage(
    hours_done: f64,
    hours_target: f64,
    points_done: f64,
    points_target: f64,
) -> f64 {
    let ratios: Vec<f64> = [(hours_done, hours_target), (points_done, points_target)]
        .into_iter()
        .filter(|(_, target)| *target > 0.0)
        .map(|(done, target)| done.max(0.0) / target * 100.0)
        .collect();

    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// The current local calendar month formatted as `YYYY-MM`.
pub fn current_month_year() -> String {
    let now = Local::now();
    format!("{:04}-{:02}", now.year(), now.month())
}

/// Validate a `YYYY-MM` month key.
pub fn validate_month_year(value: &str) -> Result<(), CoreError> {
    let invalid = || {
        CoreError::Validation(format!(
            "Invalid month '{value}'. Expected format YYYY-MM"
        ))
    };

    let (year, month) = value.split_once('-').ok_or_else(invalid)?;
    let digits =
        |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(month, 2) {
        return Err(invalid());
    }
    let _: u16 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate the numeric fields of a goal. Targets and progress may be zero
/// but never negative.
pub fn validate_goal_values(values: &[(&str, f64)]) -> Result<(), CoreError> {
    for (name, value) in values {
        if !value.is_finite() || *value < 0.0 {
            return Err(CoreError::Validation(format!(
                "{name} must be a non-negative number"
            )));
        }
    }
    Ok(())
}

/// Validate an embedded goal checklist.
pub fn validate_goal_checklist(items: &[GoalChecklistItem]) -> Result<(), CoreError> {
    if items.len() > MAX_GOAL_CHECKLIST_ITEMS {
        return Err(CoreError::Validation(format!(
            "A goal checklist may hold at most {MAX_GOAL_CHECKLIST_ITEMS} items"
        )));
    }
    if items.iter().any(|i| i.title.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Goal checklist items must have a title".to_string(),
        ));
    }
    Ok(())
}

/// Fraction of completed checklist entries as a percentage (0 when empty).
pub fn checklist_completion(items: &[GoalChecklistItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let done = items.iter().filter(|i| i.completed).count();
    done as f64 / items.len() as f64 * 100.0
}
