//! One-time codes for company email verification.
//!
//! Codes are six random digits. Only the SHA-256 digest is persisted, next to
//! an expiry timestamp and a failed-attempt counter on the user row.

use rand::Rng;

use crate::error::CoreError;
use crate::hashing::{digests_match, sha256_hex};
use crate::types::Timestamp;

/// Number of digits in a verification code.
pub const OTP_LENGTH: usize = 6;

/// Minutes a freshly issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Failed submissions tolerated before the stored code is burned.
pub const MAX_OTP_ATTEMPTS: i32 = 5;

/// Generate a numeric verification code of [`OTP_LENGTH`] digits.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Digest stored in place of the plaintext code.
pub fn hash_otp(code: &str) -> String {
    sha256_hex(code.trim().as_bytes())
}

/// Verification state read from the user row.
#[derive(Debug, Clone, Copy)]
pub struct StoredOtp<'a> {
    pub code_hash: Option<&'a str>,
    pub expires_at: Option<Timestamp>,
    pub attempts: i32,
    pub already_verified: bool,
}

/// Why a submitted code was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OtpRejection {
    #[error("Company email is already verified")]
    AlreadyVerified,
    #[error("No verification code has been requested")]
    NoCodeStored,
    #[error("Verification code has expired")]
    Expired,
    #[error("Too many failed attempts. Request a new code")]
    TooManyAttempts,
    #[error("Verification code is incorrect")]
    Mismatch,
}

impl OtpRejection {
    /// Whether the rejection should count against the attempt budget.
    pub fn counts_as_attempt(self) -> bool {
        matches!(self, OtpRejection::Mismatch)
    }
}

impl From<OtpRejection> for CoreError {
    fn from(value: OtpRejection) -> Self {
        match value {
            OtpRejection::AlreadyVerified => CoreError::Conflict(value.to_string()),
            _ => CoreError::Validation(value.to_string()),
        }
    }
}

/// Check a submitted code against the stored verification state.
///
/// Rejection order: already verified, nothing stored, expired, attempts
/// exhausted, mismatch. A code is expired once `now` is strictly after the
/// stored expiry.
pub fn verify_otp(
    stored: &StoredOtp<'_>,
    submitted: &str,
    now: Timestamp,
) -> Result<(), OtpRejection> {
    if stored.already_verified {
        return Err(OtpRejection::AlreadyVerified);
    }
    let (Some(code_hash), Some(expires_at)) = (stored.code_hash, stored.expires_at) else {
        return Err(OtpRejection::NoCodeStored);
    };
    if now > expires_at {
        return Err(OtpRejection::Expired);
    }
    if stored.attempts >= MAX_OTP_ATTEMPTS {
        return Err(OtpRejection::TooManyAttempts);
    }
    if !digests_match(&hash_otp(submitted), code_hash) {
        return Err(OtpRejection::Mismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn stored(hash: &str, expires_at: Timestamp) -> StoredOtp<'_> {
        StoredOtp {
            code_hash: Some(hash),
            expires_at: Some(expires_at),
            attempts: 0,
            already_verified: false,
        }
    }

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn correct_code_within_window_passes() {
        let hash = hash_otp("482913");
        let now = Utc::now();
        let state = stored(&hash, now + Duration::minutes(OTP_TTL_MINUTES));
        assert!(verify_otp(&state, "482913", now).is_ok());
        // Surrounding whitespace from form input is ignored.
        assert!(verify_otp(&state, " 482913 ", now).is_ok());
    }

    #[test]
    fn expired_code_is_rejected() {
        let hash = hash_otp("482913");
        let now = Utc::now();
        let state = stored(&hash, now - Duration::seconds(1));
        assert_eq!(verify_otp(&state, "482913", now), Err(OtpRejection::Expired));
    }

    #[test]
    fn expiry_instant_itself_is_still_valid() {
        let hash = hash_otp("482913");
        let now = Utc::now();
        let state = stored(&hash, now);
        assert!(verify_otp(&state, "482913", now).is_ok());
    }

    #[test]
    fn any_code_rejected_when_none_stored() {
        let state = StoredOtp {
            code_hash: None,
            expires_at: None,
            attempts: 0,
            already_verified: false,
        };
        assert_eq!(
            verify_otp(&state, "000000", Utc::now()),
            Err(OtpRejection::NoCodeStored)
        );
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        let hash = hash_otp("482913");
        let now = Utc::now();
        let state = stored(&hash, now + Duration::minutes(5));
        let err = verify_otp(&state, "111111", now).unwrap_err();
        assert_eq!(err, OtpRejection::Mismatch);
        assert!(err.counts_as_attempt());
    }

    #[test]
    fn exhausted_attempts_block_even_correct_code() {
        let hash = hash_otp("482913");
        let now = Utc::now();
        let mut state = stored(&hash, now + Duration::minutes(5));
        state.attempts = MAX_OTP_ATTEMPTS;
        assert_eq!(
            verify_otp(&state, "482913", now),
            Err(OtpRejection::TooManyAttempts)
        );
    }

    #[test]
    fn already_verified_maps_to_conflict() {
        let state = StoredOtp {
            code_hash: None,
            expires_at: None,
            attempts: 0,
            already_verified: true,
        };
        let err = verify_otp(&state, "482913", Utc::now()).unwrap_err();
        assert_matches!(CoreError::from(err), CoreError::Conflict(_));
        assert_matches!(
            CoreError::from(OtpRejection::Expired),
            CoreError::Validation(_)
        );
    }
}
