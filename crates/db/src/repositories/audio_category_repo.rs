//! Repository for the `audio_categories` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::audio::{AudioCategory, CreateAudioCategory, UpdateAudioCategory};

const COLUMNS: &str = "id, name, description, sort_order, created_at, updated_at";

pub struct AudioCategoryRepo;

impl AudioCategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAudioCategory,
    ) -> Result<AudioCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO audio_categories (name, description, sort_order)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioCategory>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// List all categories in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<AudioCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audio_categories ORDER BY sort_order, name");
        sqlx::query_as::<_, AudioCategory>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAudioCategory,
    ) -> Result<Option<AudioCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE audio_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                sort_order = COALESCE($4, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category; files keep existing with `category_id = NULL`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audio_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
