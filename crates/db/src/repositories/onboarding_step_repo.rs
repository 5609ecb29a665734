//! Repository for `onboarding_steps` and `onboarding_step_status`.

use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding_step::{
    CreateOnboardingStep, OnboardingStep, UpdateOnboardingStep, UserStepStatus,
};

const COLUMNS: &str =
    "id, title, description, link_url, order_index, is_active, created_at, updated_at";

pub struct OnboardingStepRepo;

impl OnboardingStepRepo {
    /// Insert a step. Without an explicit index it is appended at the end.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOnboardingStep,
    ) -> Result<OnboardingStep, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_steps (title, description, link_url, order_index)
             VALUES ($1, $2, $3,
                     COALESCE($4, (SELECT COALESCE(MAX(order_index) + 1, 0) FROM onboarding_steps)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingStep>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.link_url)
            .bind(input.order_index)
            .fetch_one(pool)
            .await
    }

    /// List steps in display order. Inactive steps only when asked.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<OnboardingStep>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_steps
             WHERE is_active OR $1
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, OnboardingStep>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OnboardingStep>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_steps WHERE id = $1");
        sqlx::query_as::<_, OnboardingStep>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOnboardingStep,
    ) -> Result<Option<OnboardingStep>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_steps SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                link_url = COALESCE($4, link_url),
                order_index = COALESCE($5, order_index),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingStep>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.link_url)
            .bind(input.order_index)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a step and every completion flag for it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM onboarding_steps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Per-user status
    // -----------------------------------------------------------------------

    /// Active steps with the user's completion flag (false when untouched).
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserStepStatus>, sqlx::Error> {
        sqlx::query_as::<_, UserStepStatus>(
            "SELECT s.id AS step_id, s.title, s.description, s.link_url, s.order_index,
                    COALESCE(st.completed, false) AS completed, st.completed_at
             FROM onboarding_steps s
             LEFT JOIN onboarding_step_status st
                    ON st.step_id = s.id AND st.user_id = $1
             WHERE s.is_active
             ORDER BY s.order_index, s.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Upsert the completion flag for (user, step).
    pub async fn set_completed(
        pool: &PgPool,
        user_id: DbId,
        step_id: DbId,
        completed: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO onboarding_step_status (user_id, step_id, completed, completed_at)
             VALUES ($1, $2, $3, CASE WHEN $3 THEN NOW() END)
             ON CONFLICT (user_id, step_id) DO UPDATE SET
                completed = EXCLUDED.completed,
                completed_at = CASE
                    WHEN EXCLUDED.completed THEN COALESCE(onboarding_step_status.completed_at, NOW())
                END",
        )
        .bind(user_id)
        .bind(step_id)
        .bind(completed)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// `(completed, total)` over active steps for a user.
    pub async fn progress_for_user(pool: &PgPool, user_id: DbId) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE st.completed) AS completed,
                    COUNT(*) AS total
             FROM onboarding_steps s
             LEFT JOIN onboarding_step_status st
                    ON st.step_id = s.id AND st.user_id = $1
             WHERE s.is_active",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
