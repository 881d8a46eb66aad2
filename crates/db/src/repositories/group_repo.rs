//! Repository for the `groups` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::{CreateGroup, Group, GroupSummary, UpdateGroup};

const COLUMNS: &str = "id, name, description, created_by, created_at, updated_at";

/// Provides CRUD operations for support groups.
pub struct GroupRepo;

impl GroupRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateGroup,
        created_by: DbId,
    ) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all groups with participant counts.
    pub async fn list(pool: &PgPool) -> Result<Vec<GroupSummary>, sqlx::Error> {
        sqlx::query_as::<_, GroupSummary>(
            "SELECT g.id, g.name, g.description, COUNT(p.id) AS participant_count, g.created_at
             FROM groups g
             LEFT JOIN participants p ON p.group_id = g.id
             GROUP BY g.id
             ORDER BY g.name",
        )
        .fetch_all(pool)
        .await
    }

    /// List the groups a user participates in.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<GroupSummary>, sqlx::Error> {
        sqlx::query_as::<_, GroupSummary>(
            "SELECT g.id, g.name, g.description,
                    (SELECT COUNT(*) FROM participants c WHERE c.group_id = g.id) AS participant_count,
                    g.created_at
             FROM groups g
             JOIN participants p ON p.group_id = g.id
             WHERE p.user_id = $1
             ORDER BY g.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGroup,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "UPDATE groups SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a group and its memberships.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
