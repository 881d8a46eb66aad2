//! Repository for the `participants` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::{Participant, ParticipantInfo};

/// Provides group membership operations.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Add a user to a group. Fails with `uq_participants_group_user` on duplicates.
    pub async fn add(pool: &PgPool, group_id: DbId, user_id: DbId) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (group_id, user_id)
             VALUES ($1, $2)
             RETURNING id, group_id, user_id, joined_at",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// List a group's participants with their email and profile name.
    pub async fn list_for_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<ParticipantInfo>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantInfo>(
            "SELECT p.id, p.group_id, p.user_id, u.email, c.full_name, p.joined_at
             FROM participants p
             JOIN users u ON u.id = p.user_id
             LEFT JOIN clientes c ON c.user_id = p.user_id
             WHERE p.group_id = $1
             ORDER BY p.joined_at, p.id",
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    /// Remove a user from a group. Returns `true` if a membership was removed.
    pub async fn remove(pool: &PgPool, group_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM participants WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
