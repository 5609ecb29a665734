use crate::types::DbId;

/// Rule violations raised by the pure portal logic. The API maps each
/// variant onto one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No row with that id, or one the caller may not see.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    /// Input that breaks a portal rule (a month outside 1-12, a slug with
    /// spaces, an answer to a question the form does not have).
    #[error("{0}")]
    Validation(String),

    /// The request collides with current state: a claimed company email, a
    /// sold-out product, a second registration.
    #[error("{0}")]
    Conflict(String),

    #[error("Not signed in: {0}")]
    Unauthorized(String),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
