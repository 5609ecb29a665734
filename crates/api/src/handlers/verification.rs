//! Company email verification by one-time code.
//!
//! Sending stores only the SHA-256 of the code next to a 10 minute expiry;
//! verifying checks it with [`onboard_core::otp::verify_otp`].

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use onboard_core::error::CoreError;
use onboard_core::otp::{self, OTP_TTL_MINUTES};
use onboard_core::profile::{normalize_email, validate_company_email};
use onboard_core::types::Timestamp;
use onboard_db::models::user::UserResponse;
use onboard_db::repositories::{EmailVerifyOutcome, UserRepo};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::profile::load_user;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /profile/email/otp`.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CodeSent {
    pub email: String,
    pub expires_at: Timestamp,
}

/// Request body for `POST /profile/email/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

/// POST /api/v1/profile/email/otp
///
/// Issue a new code for `email`, replacing any earlier one and resetting the
/// attempt counter.
pub async fn send_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SendCodeRequest>,
) -> AppResult<Json<DataResponse<CodeSent>>> {
    validate_company_email(&input.email, state.config.company_email_domain.as_deref())?;
    let email = normalize_email(&input.email);

    let user = load_user(&state, auth.user_id).await?;
    if user.company_email_verified {
        return Err(AppError::Core(CoreError::Conflict(
            "Company email is already verified".to_string(),
        )));
    }
    if let Some(holder) = UserRepo::find_by_company_email(&state.pool, &email).await? {
        if holder.id != user.id {
            return Err(AppError::Core(CoreError::Conflict(
                "This email is already registered to another account".to_string(),
            )));
        }
    }

    let code = otp::generate_otp();
    let expires_at = Utc::now() + chrono::Duration::minutes(OTP_TTL_MINUTES);
    UserRepo::store_verification_code(
        &state.pool,
        user.id,
        &email,
        &otp::hash_otp(&code),
        expires_at,
    )
    .await?;

    state
        .mailer
        .send_verification_code(&email, &code)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send verification email: {e}")))?;

    tracing::info!(user_id = user.id, "Verification code sent");
    Ok(Json(DataResponse {
        data: CodeSent { email, expires_at },
    }))
}

/// POST /api/v1/profile/email/verify
///
/// Only a wrong code counts toward the attempt limit; expired or missing
/// codes are rejected without touching the counter.
pub async fn verify_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let outcome =
        UserRepo::verify_email_code(&state.pool, auth.user_id, &input.code, Utc::now()).await?;
    let user = match outcome {
        EmailVerifyOutcome::Verified(user) => user,
        EmailVerifyOutcome::Rejected(rejection) => {
            tracing::info!(user_id = auth.user_id, reason = %rejection, "Verification code rejected");
            return Err(AppError::Core(rejection.into()));
        }
        EmailVerifyOutcome::UserNotFound => {
            return Err(AppError::unauthorized("User no longer exists"))
        }
    };

    tracing::info!(user_id = user.id, "Company email verified");
    state.publish(
        PlatformEvent::new(event_types::EMAIL_VERIFIED)
            .with_source("user", user.id)
            .with_actor(user.id)
            .with_payload(serde_json::json!({ "email": user.company_email })),
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
