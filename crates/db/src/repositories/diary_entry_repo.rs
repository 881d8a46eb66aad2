//! Repository for the `diary_entries` table.

use chrono::NaiveDate;
use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::diary::{CreateDiaryEntry, DiaryEntry, MoodDay, UpdateDiaryEntry};

const COLUMNS: &str = "id, page_id, user_id, title, content, mood_score, mood_label, \
                        created_at, updated_at";

/// Provides CRUD operations for diary entries, always scoped to the owner.
pub struct DiaryEntryRepo;

impl DiaryEntryRepo {
    /// Insert an entry on `page_id` owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        page_id: DbId,
        input: &CreateDiaryEntry,
    ) -> Result<DiaryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO diary_entries (page_id, user_id, title, content, mood_score, mood_label)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(page_id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.mood_score)
            .bind(&input.mood_label)
            .fetch_one(pool)
            .await
    }

    /// Find an entry owned by `user_id`.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<DiaryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM diary_entries WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the entries on a page in creation order.
    pub async fn list_for_page(
        pool: &PgPool,
        user_id: DbId,
        page_id: DbId,
    ) -> Result<Vec<DiaryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM diary_entries
             WHERE page_id = $1 AND user_id = $2
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(page_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Partially update an entry. Returns `None` if the caller does not own it.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateDiaryEntry,
    ) -> Result<Option<DiaryEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE diary_entries SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                mood_score = COALESCE($5, mood_score),
                mood_label = COALESCE($6, mood_label)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.mood_score)
            .bind(&input.mood_label)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Returns `true` if the caller owned it.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Daily average mood between `from` and `to` (inclusive), oldest first.
    ///
    /// Days without any scored entry are omitted.
    pub async fn mood_summary(
        pool: &PgPool,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodDay>, sqlx::Error> {
        sqlx::query_as::<_, MoodDay>(
            "SELECT p.page_date,
                    AVG(e.mood_score)::FLOAT8 AS average_mood,
                    COUNT(e.id) AS entry_count
             FROM diary_entries e
             JOIN diary_pages p ON p.id = e.page_id
             WHERE e.user_id = $1
               AND e.mood_score IS NOT NULL
               AND p.page_date BETWEEN $2 AND $3
             GROUP BY p.page_date
             ORDER BY p.page_date",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
