//! Company events: scheduling validation, registration gating and tickets.

use rand::Rng;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Length of the random suffix of a registration reference.
pub const REFERENCE_SUFFIX_LENGTH: usize = 8;

/// Prefix of every registration reference number.
pub const REFERENCE_PREFIX: &str = "EVT";

const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Validate an event definition.
pub fn validate_event(
    title: &str,
    starts_at: Timestamp,
    ends_at: Option<Timestamp>,
    capacity: Option<i32>,
) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Event title is required".to_string()));
    }
    if let Some(ends_at) = ends_at {
        if ends_at < starts_at {
            return Err(CoreError::Validation(
                "Event cannot end before it starts".to_string(),
            ));
        }
    }
    if let Some(capacity) = capacity {
        if capacity <= 0 {
            return Err(CoreError::Validation(
                "Capacity must be positive when set".to_string(),
            ));
        }
    }
    Ok(())
}

/// Check whether a new registration is accepted.
///
/// `capacity = None` means unlimited seats.
pub fn check_registration(
    is_published: bool,
    registration_open: bool,
    capacity: Option<i32>,
    registered: i64,
) -> Result<(), CoreError> {
    if !is_published {
        return Err(CoreError::Validation("Event is not published".to_string()));
    }
    if !registration_open {
        return Err(CoreError::Validation(
            "Registration for this event is closed".to_string(),
        ));
    }
    if let Some(capacity) = capacity {
        if registered >= i64::from(capacity) {
            return Err(CoreError::Conflict("Event is at full capacity".to_string()));
        }
    }
    Ok(())
}

/// Seats left, or `None` for unlimited events.
pub fn remaining_seats(capacity: Option<i32>, registered: i64) -> Option<i64> {
    capacity.map(|c| (i64::from(c) - registered).max(0))
}

/// Generate a registration reference such as `EVT-42-K7M2Q9XD`.
///
/// The suffix alphabet omits characters that are easily confused when read
/// aloud at check-in (`0/O`, `1/I`).
pub fn generate_reference_number(event_id: DbId) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..REFERENCE_ALPHABET.len());
            char::from(REFERENCE_ALPHABET[idx])
        })
        .collect();
    format!("{REFERENCE_PREFIX}-{event_id}-{suffix}")
}

/// The string encoded into a ticket's QR code.
pub fn ticket_qr_payload(frontend_url: &str, reference: &str) -> String {
    format!(
        "{}/events/tickets/{reference}",
        frontend_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn event_validation() {
        let start = Utc::now();
        assert!(validate_event("Kickoff", start, Some(start + Duration::hours(2)), Some(30)).is_ok());
        assert!(validate_event("Kickoff", start, None, None).is_ok());
        assert!(validate_event("", start, None, None).is_err());
        assert!(validate_event("Kickoff", start, Some(start - Duration::hours(1)), None).is_err());
        assert!(validate_event("Kickoff", start, None, Some(0)).is_err());
    }

    #[test]
    fn registration_gating() {
        assert!(check_registration(true, true, None, 10_000).is_ok());
        assert!(check_registration(true, true, Some(10), 9).is_ok());
        assert_matches!(
            check_registration(true, true, Some(10), 10),
            Err(CoreError::Conflict(_))
        );
        assert!(check_registration(false, true, None, 0).is_err());
        assert!(check_registration(true, false, None, 0).is_err());
    }

    #[test]
    fn seats_left() {
        assert_eq!(remaining_seats(None, 5), None);
        assert_eq!(remaining_seats(Some(10), 4), Some(6));
        assert_eq!(remaining_seats(Some(3), 5), Some(0));
    }

    #[test]
    fn reference_format() {
        let reference = generate_reference_number(42);
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "EVT");
        assert_eq!(parts[1], "42");
        assert_eq!(parts[2].len(), REFERENCE_SUFFIX_LENGTH);
        assert!(parts[2].bytes().all(|b| REFERENCE_ALPHABET.contains(&b)));
    }

    #[test]
    fn qr_payload_joins_cleanly() {
        assert_eq!(
            ticket_qr_payload("https://portal.acme.io/", "EVT-1-ABCDEFGH"),
            "https://portal.acme.io/events/tickets/EVT-1-ABCDEFGH"
        );
    }
}
