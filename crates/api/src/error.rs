use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use onboard_core::error::CoreError;
use serde::Serialize;

/// Everything a portal handler can fail with.
///
/// Rendered as `{"error": <message>, "code": <CODE>}`. Server-side failures
/// are logged in full and reach the client only as a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input outside the domain rules (bad OAuth state, a missing
    /// CAPTCHA token, an unparsable ticket reference).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Unauthorized(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Forbidden(msg.into()))
    }

    fn rejection(&self) -> Rejection {
        match self {
            Self::Core(CoreError::NotFound { entity, id }) => {
                Rejection::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{entity} with id {id} not found"))
            }
            Self::Core(CoreError::Validation(msg)) => {
                Rejection::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            Self::Core(CoreError::Conflict(msg)) => Rejection::new(StatusCode::CONFLICT, "CONFLICT", msg),
            Self::Core(CoreError::Unauthorized(msg)) => {
                Rejection::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            Self::Core(CoreError::Forbidden(msg)) => Rejection::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            Self::BadRequest(msg) => Rejection::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            Self::Database(err) => database_rejection(err).unwrap_or_else(|| Rejection::internal(self)),
            Self::Core(CoreError::Internal(_)) | Self::InternalError(_) => Rejection::internal(self),
        }
    }
}

struct Rejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rejection {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal(cause: &AppError) -> Self {
        tracing::error!(error = %cause, "Request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Rejection {
            status,
            code,
            message,
        } = self.rejection();
        let body = ErrorBody {
            error: &message,
            code,
        };
        (status, Json(body)).into_response()
    }
}

// SQLSTATE codes.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Client-facing translation of constraint failures. Only unique
/// constraints named `uq_*` are conflicts; other unique indexes are
/// programming errors and fall through to a 500.
fn database_rejection(err: &sqlx::Error) -> Option<Rejection> {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return Some(Rejection::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"))
        }
        sqlx::Error::Database(db_err) => db_err,
        _ => return None,
    };
    let constraint = db_err.constraint().unwrap_or("unnamed");

    match db_err.code().as_deref()? {
        UNIQUE_VIOLATION if constraint.starts_with("uq_") => Some(Rejection::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Already exists ({constraint})"),
        )),
        CHECK_VIOLATION => Some(Rejection::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value not allowed ({constraint})"),
        )),
        FOREIGN_KEY_VIOLATION => Some(Rejection::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Referenced record does not exist ({constraint})"),
        )),
        _ => None,
    }
}
