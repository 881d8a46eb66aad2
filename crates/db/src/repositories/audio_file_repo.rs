//! Repository for the `audio_files` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::audio::{AudioFile, CreateAudioFile, UpdateAudioFile};

const COLUMNS: &str = "id, title, description, storage_key, mime_type, size_bytes, \
                        duration_secs, category_id, mood_id, is_premium, uploaded_by, \
                        created_at, updated_at";

/// Provides CRUD operations for audio metadata.
pub struct AudioFileRepo;

impl AudioFileRepo {
    /// Record metadata for a stored object.
    pub async fn create(pool: &PgPool, input: &CreateAudioFile) -> Result<AudioFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO audio_files
                (title, description, storage_key, mime_type, size_bytes, duration_secs,
                 category_id, mood_id, is_premium, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioFile>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.storage_key)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(input.duration_secs)
            .bind(input.category_id)
            .bind(input.mood_id)
            .bind(input.is_premium)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find an audio file by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AudioFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audio_files WHERE id = $1");
        sqlx::query_as::<_, AudioFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List audio files matching optional category, mood and title search, newest first.
    pub async fn list(
        pool: &PgPool,
        category_id: Option<DbId>,
        mood_id: Option<DbId>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AudioFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audio_files
             WHERE ($1::BIGINT IS NULL OR category_id = $1)
               AND ($2::BIGINT IS NULL OR mood_id = $2)
               AND ($3::TEXT IS NULL OR title ILIKE '%' || $3 || '%')
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, AudioFile>(&query)
            .bind(category_id)
            .bind(mood_id)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Partially update metadata. Returns `None` if the row does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAudioFile,
    ) -> Result<Option<AudioFile>, sqlx::Error> {
        let query = format!(
            "UPDATE audio_files SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                duration_secs = COALESCE($4, duration_secs),
                category_id = COALESCE($5, category_id),
                mood_id = COALESCE($6, mood_id),
                is_premium = COALESCE($7, is_premium)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AudioFile>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_secs)
            .bind(input.category_id)
            .bind(input.mood_id)
            .bind(input.is_premium)
            .fetch_optional(pool)
            .await
    }

    /// Delete a row, returning it so the caller can remove the stored object.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<AudioFile>, sqlx::Error> {
        let query = format!("DELETE FROM audio_files WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, AudioFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
