//! Refresh sessions (`user_sessions`).
//!
//! A row per issued refresh token, keyed by the token's SHA-256 digest.
//! Rotation revokes the presented row and inserts its successor in one
//! transaction. Revoked rows stay until they expire so that a replayed token
//! can still be told apart from an unknown one.

use onboard_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                        user_agent, ip_address, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        Self::insert(pool, input).await
    }

    /// Unexpired session for a digest. Callers must check `is_revoked`; a
    /// revoked hit means the token was already rotated away.
    pub async fn find_by_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {COLUMNS} FROM user_sessions \
             WHERE refresh_token_hash = $1 AND expires_at > NOW()"
        ))
        .bind(hash)
        .fetch_optional(pool)
        .await
    }

    /// Swap `old_session_id` for `replacement`.
    ///
    /// `None` when another request revoked the old row first; the caller
    /// treats that as a replay.
    pub async fn rotate(
        pool: &PgPool,
        old_session_id: DbId,
        replacement: &CreateSession,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true \
             WHERE id = $1 AND NOT is_revoked",
        )
        .bind(old_session_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            return Ok(None);
        }

        let session = Self::insert(&mut *tx, replacement).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// Sign a user out everywhere. Returns how many live sessions were cut.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        Ok(sqlx::query(
            "UPDATE user_sessions SET is_revoked = true \
             WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected())
    }

    /// Drop rows past their expiry, revoked or not.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        Ok(sqlx::query("DELETE FROM user_sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?
            .rows_affected())
    }

    async fn insert<'e, E>(executor: E, input: &CreateSession) -> Result<UserSession, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserSession>(&format!(
            "INSERT INTO user_sessions \
                 (user_id, refresh_token_hash, expires_at, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        ))
        .bind(input.user_id)
        .bind(&input.refresh_token_hash)
        .bind(input.expires_at)
        .bind(&input.user_agent)
        .bind(&input.ip_address)
        .fetch_one(executor)
        .await
    }
}
