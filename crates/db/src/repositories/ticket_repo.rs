//! Repository for the `tickets` table.

use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{CreateTicket, Ticket, TicketFilter, UpdateTicket};

/// Ticket columns joined with the requester. Expects aliases `t` and `u`.
const SELECT: &str = "SELECT t.id, t.user_id, t.title, t.description, t.category, t.priority,
            t.status, t.resolution_notes, t.resolved_at, t.created_at, t.updated_at,
            u.github_username AS requester_username,
            u.first_name AS requester_first_name,
            u.last_name AS requester_last_name
     FROM tickets t
     JOIN users u ON u.id = t.user_id";

pub struct TicketRepo;

impl TicketRepo {
    /// Open a ticket for `user_id`. Priority defaults to `medium`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateTicket,
    ) -> Result<Ticket, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO tickets (user_id, title, description, category, priority)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'medium'))
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(&input.category)
        .bind(&input.priority)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("{SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's own tickets, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!("{SELECT} WHERE t.user_id = $1 ORDER BY t.created_at DESC, t.id DESC");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Owner listing with optional filters, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE ($1::TEXT IS NULL OR t.status = $1)
               AND ($2::TEXT IS NULL OR t.category = $2)
               AND ($3::BIGINT IS NULL OR t.user_id = $3)
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&filter.status)
            .bind(&filter.category)
            .bind(filter.user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply an owner update. `resolved_at` is written as given, so a reopen
    /// clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE tickets SET
                status = $2,
                priority = $3,
                resolution_notes = COALESCE($4, resolution_notes),
                resolved_at = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(&input.resolution_notes)
        .bind(input.resolved_at)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
