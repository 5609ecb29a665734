//! Refresh sessions.

use onboard_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. `refresh_token_hash` is the SHA-256 digest;
/// the plaintext only ever leaves the server in the sign-in response.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set on logout and when the token is rotated away.
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    /// Client address as reported by the reverse proxy.
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
