//! Refresh-token sessions.

use propgo_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row of `user_sessions`. One row per refresh token ever issued.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A freshly minted refresh token, as stored (hash only).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// `User-Agent` of the client the token was issued to.
    pub user_agent: Option<String>,
}
