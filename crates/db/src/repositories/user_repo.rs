//! Repository for the `users` table.

use onboard_core::otp::{self, OtpRejection, StoredOtp};
use onboard_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{ProvisionUser, UpdateBio, UpdateProfile, UpdateUserFlags, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, github_id, github_username, avatar_url, company_email, \
                        company_email_verified, personal_email, first_name, last_name, \
                        department, is_owner, store_access, points, verification_code_hash, \
                        verification_expires, verification_attempts, pending_email, \
                        onboarding_completed_at, last_login_at, created_at, updated_at";

/// Outcome of submitting a company email verification code.
#[derive(Debug)]
pub enum EmailVerifyOutcome {
    Verified(User),
    Rejected(OtpRejection),
    UserNotFound,
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a freshly signed-in GitHub user. New users are never owners and
    /// start without store access or points.
    pub async fn provision(pool: &PgPool, input: &ProvisionUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (github_id, github_username, avatar_url, personal_email, \
                                first_name, last_name, is_owner, store_access, points)
             VALUES ($1, $2, $3, $4, $5, $6, false, false, 0)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.github_id)
            .bind(&input.github_username)
            .bind(&input.avatar_url)
            .bind(&input.personal_email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by GitHub account id.
    pub async fn find_by_github_id(
        pool: &PgPool,
        github_id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE github_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(github_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the user owning a verified company email (case-insensitive).
    pub async fn find_by_company_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(company_email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Read only the owner flag. Returns `None` when the user does not exist.
    pub async fn is_owner(pool: &PgPool, id: DbId) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar("SELECT is_owner FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List users ordered by most recently created first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Refresh GitHub-sourced fields and stamp `last_login_at`.
    pub async fn record_login(
        pool: &PgPool,
        id: DbId,
        github_username: &str,
        avatar_url: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                github_username = $2,
                avatar_url = COALESCE($3, avatar_url),
                last_login_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(github_username)
            .bind(avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Save the bio step. Returns `None` if no row with the given `id` exists.
    pub async fn update_bio(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBio,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                first_name = $2,
                last_name = $3,
                department = COALESCE($4, department)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.department)
            .fetch_optional(pool)
            .await
    }

    /// Update self-service profile settings. Only non-`None` fields are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                personal_email = COALESCE($2, personal_email),
                department = COALESCE($3, department),
                avatar_url = COALESCE($4, avatar_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.personal_email)
            .bind(&input.department)
            .bind(&input.avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Update owner-managed flags. Only non-`None` fields are applied.
    pub async fn update_flags(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUserFlags,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                is_owner = COALESCE($2, is_owner),
                store_access = COALESCE($3, store_access),
                department = COALESCE($4, department)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.is_owner)
            .bind(input.store_access)
            .bind(&input.department)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Email verification
    // -----------------------------------------------------------------------

    /// Store a fresh verification code digest for `email`, resetting the
    /// attempt counter.
    pub async fn store_verification_code(
        pool: &PgPool,
        id: DbId,
        email: &str,
        code_hash: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                pending_email = $2,
                verification_code_hash = $3,
                verification_expires = $4,
                verification_attempts = 0
             WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check `submitted` against the stored code and, when it matches,
    /// promote the pending address to the verified company email.
    ///
    /// The user row stays locked from the read to the write, so concurrent
    /// submissions queue behind each other: each sees the attempt count the
    /// previous one left, and a code re-sent in between cannot swap the
    /// pending address. A mismatch commits the incremented counter.
    pub async fn verify_email_code(
        pool: &PgPool,
        id: DbId,
        submitted: &str,
        now: Timestamp,
    ) -> Result<EmailVerifyOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let Some(user) = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(EmailVerifyOutcome::UserNotFound);
        };

        let stored = StoredOtp {
            code_hash: user.verification_code_hash.as_deref(),
            expires_at: user.verification_expires,
            attempts: user.verification_attempts,
            already_verified: user.company_email_verified,
        };
        if let Err(rejection) = otp::verify_otp(&stored, submitted, now) {
            if rejection.counts_as_attempt() {
                sqlx::query(
                    "UPDATE users SET verification_attempts = verification_attempts + 1
                     WHERE id = $1",
                )
                .bind(id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
            } else {
                tx.rollback().await?;
            }
            return Ok(EmailVerifyOutcome::Rejected(rejection));
        }

        let query = format!(
            "UPDATE users SET
                company_email = pending_email,
                company_email_verified = true,
                pending_email = NULL,
                verification_code_hash = NULL,
                verification_expires = NULL,
                verification_attempts = 0
             WHERE id = $1 AND verification_code_hash = $2
             RETURNING {COLUMNS}"
        );
        let verified = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&user.verification_code_hash)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EmailVerifyOutcome::Verified(verified))
    }

    /// Stamp `onboarding_completed_at` if it is not already set.
    pub async fn complete_onboarding(pool: &PgPool, id: DbId) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET onboarding_completed_at = COALESCE(onboarding_completed_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
