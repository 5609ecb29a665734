//! Handlers for the signed-in user's profile and the onboarding wizard.
//!
//! The wizard has three steps: bio, company email verification, and the
//! onboarding checklist. Completion is stamped only once all three are done.

use axum::extract::State;
use axum::Json;
use onboard_core::checklist::ChecklistProgress;
use onboard_core::error::CoreError;
use onboard_core::profile::{self, WizardProgress};
use onboard_core::types::Timestamp;
use onboard_db::models::user::{UpdateBio, UpdateProfile, User, UserResponse};
use onboard_db::repositories::{OnboardingStepRepo, UserRepo};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Wizard state returned by `GET /profile/wizard`.
#[derive(Debug, Serialize)]
pub struct WizardStatus {
    #[serde(flatten)]
    pub progress: WizardProgress,
    /// `bio`, `email`, `checklist`, or `null` when every step is done.
    pub next_step: Option<&'static str>,
    pub is_complete: bool,
    pub checklist: ChecklistProgress,
    pub onboarding_completed_at: Option<Timestamp>,
}

pub(crate) async fn load_user(state: &AppState, user_id: i64) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))
}

async fn wizard_status(state: &AppState, user: &User) -> AppResult<WizardStatus> {
    let (completed, total) = OnboardingStepRepo::progress_for_user(&state.pool, user.id).await?;
    let checklist = ChecklistProgress::new(completed, total);
    let progress = WizardProgress {
        bio_completed: user.bio_completed(),
        email_verified: user.company_email_verified,
        checklist_completed: checklist.is_complete,
    };
    Ok(WizardStatus {
        next_step: progress.next_step(),
        is_complete: progress.is_complete(),
        progress,
        checklist,
        onboarding_completed_at: user.onboarding_completed_at,
    })
}

/// PUT /api/v1/profile/bio
pub async fn update_bio(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateBio>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    profile::validate_bio(&input.first_name, &input.last_name, input.department.as_deref())?;

    let input = UpdateBio {
        department: input
            .department
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        ..input
    };
    let user = UserRepo::update_bio(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    tracing::info!(user_id = user.id, "Bio updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/profile
///
/// Personal email and department. Omitted fields are left unchanged.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let personal_email = match input.personal_email.as_deref() {
        Some(email) => {
            profile::validate_email(email)?;
            Some(profile::normalize_email(email))
        }
        None => None,
    };
    profile::validate_optional_text(input.department.as_deref(), "Department")?;

    let input = UpdateProfile {
        personal_email,
        department: input.department.map(|d| d.trim().to_string()),
        avatar_url: input.avatar_url,
    };
    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// GET /api/v1/profile/wizard
pub async fn get_wizard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<WizardStatus>>> {
    let user = load_user(&state, auth.user_id).await?;
    let status = wizard_status(&state, &user).await?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/profile/wizard/complete
///
/// Rejected with 400 while any wizard step is outstanding. Repeating the
/// call keeps the original completion time.
pub async fn complete_wizard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<WizardStatus>>> {
    let user = load_user(&state, auth.user_id).await?;
    let status = wizard_status(&state, &user).await?;

    if let Some(step) = status.next_step {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Onboarding is not complete: the '{step}' step is outstanding"
        ))));
    }

    let first_completion = user.onboarding_completed_at.is_none();
    let user = UserRepo::complete_onboarding(&state.pool, user.id).await?;
    if first_completion {
        tracing::info!(user_id = user.id, "Onboarding completed");
        state.publish(
            PlatformEvent::new(event_types::ONBOARDING_COMPLETED)
                .with_source("user", user.id)
                .with_actor(user.id),
        );
    }

    let status = wizard_status(&state, &user).await?;
    Ok(Json(DataResponse { data: status }))
}
