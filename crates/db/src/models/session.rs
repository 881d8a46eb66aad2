//! Refresh-token sessions.

use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table. One row per issued refresh token.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 of the refresh token; the token itself is never stored.
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set when the token is rotated, on logout and on password change.
    pub is_revoked: bool,
    /// `User-Agent` of the client the token was issued to.
    pub user_agent: Option<String>,
    /// Client address, first hop of `X-Forwarded-For` when present.
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
