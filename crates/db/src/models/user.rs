//! User entity model and DTOs.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// Full user row from the `users` table.
///
/// Contains the verification code hash -- NEVER serialize this to API
/// responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub github_id: i64,
    pub github_username: String,
    pub avatar_url: Option<String>,
    pub company_email: Option<String>,
    pub company_email_verified: bool,
    pub personal_email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub is_owner: bool,
    pub store_access: bool,
    pub points: i32,
    pub verification_code_hash: Option<String>,
    pub verification_expires: Option<Timestamp>,
    pub verification_attempts: i32,
    pub pending_email: Option<String>,
    pub onboarding_completed_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether the bio step of the wizard has been filled in.
    pub fn bio_completed(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.first_name) && filled(&self.last_name)
    }

    /// `First Last`, falling back to the GitHub username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.github_username.clone(),
        }
    }
}

/// Safe user representation for API responses (no verification secrets).
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct UserResponse {
    pub id: DbId,
    pub github_username: String,
    pub avatar_url: Option<String>,
    pub company_email: Option<String>,
    pub company_email_verified: bool,
    pub personal_email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub is_owner: bool,
    pub store_access: bool,
    pub points: i32,
    /// Address a verification code is currently pending for.
    pub pending_email: Option<String>,
    pub onboarding_completed_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            github_username: user.github_username.clone(),
            avatar_url: user.avatar_url.clone(),
            company_email: user.company_email.clone(),
            company_email_verified: user.company_email_verified,
            personal_email: user.personal_email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            department: user.department.clone(),
            is_owner: user.is_owner,
            store_access: user.store_access,
            points: user.points,
            pending_email: user.pending_email.clone(),
            onboarding_completed_at: user.onboarding_completed_at,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for provisioning a user on first GitHub sign-in.
#[derive(Debug, Clone)]
pub struct ProvisionUser {
    pub github_id: i64,
    pub github_username: String,
    pub avatar_url: Option<String>,
    pub personal_email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// DTO for the bio step of the onboarding wizard.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBio {
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
}

/// DTO for the user's own profile settings. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub personal_email: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for owner-managed account flags. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserFlags {
    pub is_owner: Option<bool>,
    pub store_access: Option<bool>,
    pub department: Option<String>,
}
