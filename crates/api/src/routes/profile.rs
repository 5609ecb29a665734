//! Route definitions for the `/profile` resource (onboarding wizard).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{profile, verification};
use crate::state::AppState;

/// Routes mounted at `/profile`. All require auth.
///
/// ```text
/// PUT  /                  -> update_profile
/// PUT  /bio               -> update_bio
/// POST /email/otp         -> send_code
/// POST /email/verify      -> verify_code
/// GET  /wizard            -> get_wizard
/// POST /wizard/complete   -> complete_wizard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(profile::update_profile))
        .route("/bio", put(profile::update_bio))
        .route("/email/otp", post(verification::send_code))
        .route("/email/verify", post(verification::verify_code))
        .route("/wizard", get(profile::get_wizard))
        .route("/wizard/complete", post(profile::complete_wizard))
}
