//! Stateless OAuth `state` parameter.
//!
//! The value is `<nonce>.<issued_at>.<signature>` where the signature is an
//! HMAC-SHA256 over `<nonce>.<issued_at>` keyed with the JWT secret. The
//! callback accepts it only if the signature matches and it is younger than
//! [`STATE_TTL_SECS`], so no server-side storage is needed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// How long an issued state value stays valid.
pub const STATE_TTL_SECS: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Malformed OAuth state")]
    Malformed,
    #[error("OAuth state signature mismatch")]
    BadSignature,
    #[error("OAuth state expired")]
    Expired,
}

fn mac_for(secret: &str, message: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    mac
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Issue a fresh signed state value.
pub fn issue(secret: &str, now: i64) -> String {
    let message = format!("{}.{now}", Uuid::new_v4().simple());
    let signature = hex_encode(&mac_for(secret, &message).finalize().into_bytes());
    format!("{message}.{signature}")
}

/// Verify a state value returned by the identity provider.
pub fn verify(secret: &str, state: &str, now: i64) -> Result<(), StateError> {
    let (message, signature) = state.rsplit_once('.').ok_or(StateError::Malformed)?;
    let (_, issued_at) = message.split_once('.').ok_or(StateError::Malformed)?;
    let issued_at: i64 = issued_at.parse().map_err(|_| StateError::Malformed)?;
    let signature = hex_decode(signature).ok_or(StateError::Malformed)?;

    mac_for(secret, message)
        .verify_slice(&signature)
        .map_err(|_| StateError::BadSignature)?;

    if now - issued_at > STATE_TTL_SECS || issued_at > now + 60 {
        return Err(StateError::Expired);
    }
    Ok(())
}
