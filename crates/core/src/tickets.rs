//! Support ticket categories, priorities, statuses and validation.
//!
//! Status changes are owner-driven and any status may follow any other; the
//! only rule is bookkeeping of `resolved_at`, see [`resolved_at_after`].

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

pub const CATEGORY_TECHNICAL: &str = "technical";
pub const CATEGORY_ACCESS: &str = "access";
pub const CATEGORY_HARDWARE: &str = "hardware";
pub const CATEGORY_HR: &str = "hr";
pub const CATEGORY_OTHER: &str = "other";

pub const VALID_CATEGORIES: &[&str] = &[
    CATEGORY_TECHNICAL,
    CATEGORY_ACCESS,
    CATEGORY_HARDWARE,
    CATEGORY_HR,
    CATEGORY_OTHER,
];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const VALID_PRIORITIES: &[&str] =
    &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_URGENT];

/// Initial status of every new ticket.
pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_member(value: &str, valid: &[&str], label: &str) -> Result<(), CoreError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid ticket {label} '{value}'. Must be one of: {valid:?}"
        )))
    }
}

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    validate_member(category, VALID_CATEGORIES, "category")
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    validate_member(priority, VALID_PRIORITIES, "priority")
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    validate_member(status, VALID_STATUSES, "status")
}

/// Validate the required free-text fields of a new ticket.
pub fn validate_ticket_text(title: &str, description: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Ticket title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "Ticket description is required".to_string(),
        ));
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Whether a status counts as finished work.
pub fn is_terminal(status: &str) -> bool {
    status == STATUS_RESOLVED || status == STATUS_CLOSED
}

/// Compute `resolved_at` after a status change.
///
/// Entering a terminal status stamps `now` unless a timestamp already
/// exists; returning to an active status clears it.
pub fn resolved_at_after(
    new_status: &str,
    current: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if is_terminal(new_status) {
        current.or(Some(now))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn enumerations_validate() {
        assert!(validate_category("hardware").is_ok());
        assert!(validate_category("payroll").is_err());
        assert!(validate_priority("urgent").is_ok());
        assert!(validate_priority("critical").is_err());
        assert!(validate_status("in_progress").is_ok());
        assert!(validate_status("pending").is_err());
    }

    #[test]
    fn required_text_fields() {
        assert!(validate_ticket_text("Laptop", "Screen flickers").is_ok());
        assert!(validate_ticket_text("", "Screen flickers").is_err());
        assert!(validate_ticket_text("Laptop", "  ").is_err());
        let long = "t".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_ticket_text(&long, "body").is_err());
    }

    #[test]
    fn resolving_stamps_once() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        assert_eq!(resolved_at_after(STATUS_RESOLVED, None, now), Some(now));
        assert_eq!(
            resolved_at_after(STATUS_CLOSED, Some(earlier), now),
            Some(earlier)
        );
    }

    #[test]
    fn reopening_clears_timestamp() {
        let now = Utc::now();
        assert_eq!(resolved_at_after(STATUS_OPEN, Some(now), now), None);
        assert_eq!(resolved_at_after(STATUS_IN_PROGRESS, None, now), None);
    }
}
