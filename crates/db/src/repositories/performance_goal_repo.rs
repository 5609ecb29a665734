//! Repository for the `performance_goals` table.

use onboard_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::performance_goal::{CreateGoal, GoalFilter, PerformanceGoal, UpdateGoal};

const SELECT: &str = "SELECT g.id, g.user_id, g.month_year, g.target_hours, g.completed_hours,
            g.target_story_points, g.completed_story_points, g.checklist, g.notes,
            g.created_at, g.updated_at, u.github_username, u.first_name, u.last_name
     FROM performance_goals g
     JOIN users u ON u.id = g.user_id";

pub struct PerformanceGoalRepo;

impl PerformanceGoalRepo {
    /// Insert a goal. A second goal for the same user and month violates
    /// `uq_performance_goals_user_month`.
    pub async fn create(pool: &PgPool, input: &CreateGoal) -> Result<PerformanceGoal, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO performance_goals
                (user_id, month_year, target_hours, completed_hours,
                 target_story_points, completed_story_points, checklist, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.month_year)
        .bind(input.target_hours)
        .bind(input.completed_hours)
        .bind(input.target_story_points)
        .bind(input.completed_story_points)
        .bind(Json(&input.checklist))
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PerformanceGoal>, sqlx::Error> {
        let query = format!("{SELECT} WHERE g.id = $1");
        sqlx::query_as::<_, PerformanceGoal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Goals matching the filter, newest month first.
    pub async fn list(
        pool: &PgPool,
        filter: &GoalFilter,
    ) -> Result<Vec<PerformanceGoal>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE ($1::BIGINT IS NULL OR g.user_id = $1)
               AND ($2::TEXT IS NULL OR g.month_year = $2)
             ORDER BY g.month_year DESC, u.github_username"
        );
        sqlx::query_as::<_, PerformanceGoal>(&query)
            .bind(filter.user_id)
            .bind(&filter.month_year)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGoal,
    ) -> Result<Option<PerformanceGoal>, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE performance_goals SET
                target_hours = COALESCE($2, target_hours),
                completed_hours = COALESCE($3, completed_hours),
                target_story_points = COALESCE($4, target_story_points),
                completed_story_points = COALESCE($5, completed_story_points),
                checklist = COALESCE($6, checklist),
                notes = COALESCE($7, notes)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.target_hours)
        .bind(input.completed_hours)
        .bind(input.target_story_points)
        .bind(input.completed_story_points)
        .bind(input.checklist.as_ref().map(Json))
        .bind(&input.notes)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM performance_goals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
