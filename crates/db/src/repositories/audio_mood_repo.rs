//! Repository for the `audio_moods` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::audio::{AudioMood, CreateAudioMood, UpdateAudioMood};

const COLUMNS: &str = "id, name, color, created_at, updated_at";

pub struct AudioMoodRepo;

impl AudioMoodRepo {
    pub async fn create(pool: &PgPool, input: &CreateAudioMood) -> Result<AudioMood, sqlx::Error> {
        let query = format!(
            "INSERT INTO audio_moods (name, color) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioMood>(&query)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<AudioMood>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audio_moods ORDER BY name");
        sqlx::query_as::<_, AudioMood>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAudioMood,
    ) -> Result<Option<AudioMood>, sqlx::Error> {
        let query = format!(
            "UPDATE audio_moods SET
                name = COALESCE($2, name),
                color = COALESCE($3, color)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioMood>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audio_moods WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
