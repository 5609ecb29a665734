//! Repository for dynamic checklists, their items, assignments and progress.

use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::checklist::{
    AssignmentItemStatus, AssignmentSummary, ChecklistAssignment, ChecklistItem, CreateAssignment,
    CreateChecklistItem, CreateDynamicChecklist, DynamicChecklist, UpdateChecklistItem,
    UpdateDynamicChecklist,
};

const CHECKLIST_COLUMNS: &str = "id, title, description, created_by, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, checklist_id, title, description, order_index, created_at, updated_at";

const ASSIGNMENT_COLUMNS: &str =
    "id, checklist_id, user_id, is_required, due_date, assigned_by, created_at, updated_at";

/// Assignment summary projection. Expects aliases `a`, `c`, `u`.
const SUMMARY_SELECT: &str = "SELECT a.id, a.checklist_id, c.title AS checklist_title,
            a.user_id, u.github_username, u.first_name, u.last_name,
            a.is_required, a.due_date,
            (SELECT COUNT(*) FROM checklist_item_progress p
              WHERE p.assignment_id = a.id AND p.completed) AS completed_items,
            (SELECT COUNT(*) FROM dynamic_checklist_items i
              WHERE i.checklist_id = a.checklist_id) AS total_items,
            a.created_at
     FROM checklist_assignments a
     JOIN dynamic_checklists c ON c.id = a.checklist_id
     JOIN users u ON u.id = a.user_id";

pub struct ChecklistRepo;

impl ChecklistRepo {
    // -----------------------------------------------------------------------
    // Checklists
    // -----------------------------------------------------------------------

    pub async fn create(
        pool: &PgPool,
        input: &CreateDynamicChecklist,
        created_by: DbId,
    ) -> Result<DynamicChecklist, sqlx::Error> {
        let query = format!(
            "INSERT INTO dynamic_checklists (title, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {CHECKLIST_COLUMNS}"
        );
        sqlx::query_as::<_, DynamicChecklist>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<DynamicChecklist>, sqlx::Error> {
        let query = format!(
            "SELECT {CHECKLIST_COLUMNS} FROM dynamic_checklists ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DynamicChecklist>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DynamicChecklist>, sqlx::Error> {
        let query = format!("SELECT {CHECKLIST_COLUMNS} FROM dynamic_checklists WHERE id = $1");
        sqlx::query_as::<_, DynamicChecklist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDynamicChecklist,
    ) -> Result<Option<DynamicChecklist>, sqlx::Error> {
        let query = format!(
            "UPDATE dynamic_checklists SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {CHECKLIST_COLUMNS}"
        );
        sqlx::query_as::<_, DynamicChecklist>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a checklist together with its items, assignments and progress.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dynamic_checklists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub async fn create_item(
        pool: &PgPool,
        checklist_id: DbId,
        input: &CreateChecklistItem,
    ) -> Result<ChecklistItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO dynamic_checklist_items (checklist_id, title, description, order_index)
             VALUES ($1, $2, $3,
                     COALESCE($4, (SELECT COALESCE(MAX(order_index) + 1, 0)
                                   FROM dynamic_checklist_items WHERE checklist_id = $1)))
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.order_index)
            .fetch_one(pool)
            .await
    }

    pub async fn list_items(
        pool: &PgPool,
        checklist_id: DbId,
    ) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM dynamic_checklist_items
             WHERE checklist_id = $1
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .fetch_all(pool)
            .await
    }

    /// Update an item, scoped to its checklist.
    pub async fn update_item(
        pool: &PgPool,
        checklist_id: DbId,
        item_id: DbId,
        input: &UpdateChecklistItem,
    ) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "UPDATE dynamic_checklist_items SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                order_index = COALESCE($5, order_index)
             WHERE id = $2 AND checklist_id = $1
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .bind(item_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.order_index)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_item(
        pool: &PgPool,
        checklist_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM dynamic_checklist_items WHERE id = $2 AND checklist_id = $1")
                .bind(checklist_id)
                .bind(item_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Assignments
    // -----------------------------------------------------------------------

    /// Assign a checklist to a user. A duplicate assignment violates
    /// `uq_checklist_assignments_checklist_user`.
    pub async fn assign(
        pool: &PgPool,
        checklist_id: DbId,
        input: &CreateAssignment,
        assigned_by: DbId,
    ) -> Result<ChecklistAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO checklist_assignments (checklist_id, user_id, is_required, due_date, assigned_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistAssignment>(&query)
            .bind(checklist_id)
            .bind(input.user_id)
            .bind(input.is_required)
            .bind(input.due_date)
            .bind(assigned_by)
            .fetch_one(pool)
            .await
    }

    pub async fn unassign(
        pool: &PgPool,
        checklist_id: DbId,
        assignment_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM checklist_assignments WHERE id = $2 AND checklist_id = $1")
                .bind(checklist_id)
                .bind(assignment_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_assignment(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Option<ChecklistAssignment>, sqlx::Error> {
        let query = format!("SELECT {ASSIGNMENT_COLUMNS} FROM checklist_assignments WHERE id = $1");
        sqlx::query_as::<_, ChecklistAssignment>(&query)
            .bind(assignment_id)
            .fetch_optional(pool)
            .await
    }

    /// Assignment summaries for one checklist.
    pub async fn list_assignments(
        pool: &PgPool,
        checklist_id: DbId,
    ) -> Result<Vec<AssignmentSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE a.checklist_id = $1 ORDER BY a.created_at, a.id");
        sqlx::query_as::<_, AssignmentSummary>(&query)
            .bind(checklist_id)
            .fetch_all(pool)
            .await
    }

    /// Assignment summaries for one user, soonest due first.
    pub async fn list_assignments_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AssignmentSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} WHERE a.user_id = $1
             ORDER BY a.due_date NULLS LAST, a.created_at, a.id"
        );
        sqlx::query_as::<_, AssignmentSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Items of an assignment's checklist with their completion state.
    pub async fn assignment_items(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Vec<AssignmentItemStatus>, sqlx::Error> {
        sqlx::query_as::<_, AssignmentItemStatus>(
            "SELECT i.id AS item_id, i.title, i.description, i.order_index,
                    COALESCE(p.completed, false) AS completed, p.completed_at
             FROM checklist_assignments a
             JOIN dynamic_checklist_items i ON i.checklist_id = a.checklist_id
             LEFT JOIN checklist_item_progress p
                    ON p.assignment_id = a.id AND p.item_id = i.id
             WHERE a.id = $1
             ORDER BY i.order_index, i.id",
        )
        .bind(assignment_id)
        .fetch_all(pool)
        .await
    }

    /// Set completion of an item within an assignment.
    ///
    /// Returns `false` when the item does not belong to the assignment's
    /// checklist.
    pub async fn set_item_completed(
        pool: &PgPool,
        assignment_id: DbId,
        item_id: DbId,
        completed: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO checklist_item_progress (assignment_id, item_id, completed, completed_at)
             SELECT a.id, i.id, $3, CASE WHEN $3 THEN NOW() END
             FROM checklist_assignments a
             JOIN dynamic_checklist_items i ON i.checklist_id = a.checklist_id
             WHERE a.id = $1 AND i.id = $2
             ON CONFLICT (assignment_id, item_id) DO UPDATE SET
                completed = EXCLUDED.completed,
                completed_at = CASE
                    WHEN EXCLUDED.completed THEN COALESCE(checklist_item_progress.completed_at, NOW())
                END",
        )
        .bind(assignment_id)
        .bind(item_id)
        .bind(completed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
