//! Shared rewrite of `order_index` for ordered child blocks.

use onboard_core::error::CoreError;
use onboard_core::ordering::validate_reorder;
use onboard_core::types::DbId;
use sqlx::PgPool;

/// Outcome of a reorder request.
#[derive(Debug)]
pub enum ReorderOutcome {
    Reordered,
    /// The requested ids are not a permutation of the container's blocks.
    Rejected(CoreError),
}

/// Rewrite `order_index` of every row in `table` whose `parent_column`
/// equals `parent_id`, following the order of `requested`.
///
/// The container's rows are locked first, so a concurrent insert or reorder
/// waits for this transaction. `table` and `parent_column` are trusted
/// constants, never user input.
pub(crate) async fn reorder_children(
    pool: &PgPool,
    table: &'static str,
    parent_column: &'static str,
    parent_id: DbId,
    requested: &[DbId],
) -> Result<ReorderOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = format!("SELECT id FROM {table} WHERE {parent_column} = $1 ORDER BY id FOR UPDATE");
    let existing: Vec<DbId> = sqlx::query_scalar(&query)
        .bind(parent_id)
        .fetch_all(&mut *tx)
        .await?;

    if let Err(rejection) = validate_reorder(&existing, requested) {
        tx.rollback().await?;
        return Ok(ReorderOutcome::Rejected(rejection));
    }

    let query = format!(
        "UPDATE {table} AS t SET order_index = v.position - 1
         FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS v(id, position)
         WHERE t.id = v.id AND t.{parent_column} = $1"
    );
    sqlx::query(&query)
        .bind(parent_id)
        .bind(requested)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(ReorderOutcome::Reordered)
}
