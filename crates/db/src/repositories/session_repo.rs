//! Repository for `user_sessions`.
//!
//! A session is live while it is neither revoked nor expired. Refresh
//! tokens are single-use: [`SessionRepo::rotate`] retires the presented
//! token and stores its successor in one transaction, so a token replayed
//! concurrently yields at most one successor.

use propgo_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{NewSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                        user_agent, created_at, updated_at";

const INSERT: &str = "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent)
                      VALUES ($1, $2, $3, $4)";

pub struct SessionRepo;

impl SessionRepo {
    /// Start a session for `user_id` (signup and login).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        session: &NewSession,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .bind(&session.refresh_token_hash)
            .bind(session.expires_at)
            .bind(&session.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Exchange the live session holding `presented_hash` for `next`.
    ///
    /// Returns the new session, or `None` (and changes nothing) when the
    /// presented token is unknown, revoked, or expired.
    pub async fn rotate(
        pool: &PgPool,
        presented_hash: &str,
        next: &NewSession,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE user_sessions SET is_revoked = true, updated_at = NOW()
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(presented_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let query = format!("{INSERT} RETURNING {COLUMNS}");
        let session = sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .bind(&next.refresh_token_hash)
            .bind(next.expires_at)
            .bind(&next.user_agent)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Revoke the session holding `hash` (logout). Returns the owning user
    /// when a live session was revoked.
    pub async fn revoke_by_hash(pool: &PgPool, hash: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE user_sessions SET is_revoked = true, updated_at = NOW()
             WHERE refresh_token_hash = $1 AND is_revoked = false
             RETURNING user_id",
        )
        .bind(hash)
        .fetch_optional(pool)
        .await
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, updated_at = NOW()
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
