//! Repository for the `diary_pages` table.

use chrono::NaiveDate;
use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::diary::{DiaryPage, DiaryPageSummary};

const COLUMNS: &str = "id, user_id, page_date, created_at, updated_at";

/// Provides page lookup, creation and quota counting.
pub struct DiaryPageRepo;

impl DiaryPageRepo {
    /// Find a user's page for a given day.
    pub async fn find_by_date(
        pool: &PgPool,
        user_id: DbId,
        page_date: NaiveDate,
    ) -> Result<Option<DiaryPage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM diary_pages WHERE user_id = $1 AND page_date = $2");
        sqlx::query_as::<_, DiaryPage>(&query)
            .bind(user_id)
            .bind(page_date)
            .fetch_optional(pool)
            .await
    }

    /// Return the user's page for `page_date`, creating it if needed.
    ///
    /// Concurrent callers racing on the same day converge on a single row
    /// through the `uq_diary_pages_user_date` constraint. The boolean is
    /// `true` when this call inserted the row.
    pub async fn find_or_create(
        pool: &PgPool,
        user_id: DbId,
        page_date: NaiveDate,
    ) -> Result<(DiaryPage, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO diary_pages (user_id, page_date) VALUES ($1, $2)
             ON CONFLICT (user_id, page_date) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, DiaryPage>(&insert)
            .bind(user_id)
            .bind(page_date)
            .fetch_optional(pool)
            .await?;
        if let Some(page) = inserted {
            return Ok((page, true));
        }
        let page = Self::find_by_date(pool, user_id, page_date)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((page, false))
    }

    /// Number of pages a user owns (used for plan quotas).
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM diary_pages WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's pages, newest day first, with entry counts and average mood.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DiaryPageSummary>, sqlx::Error> {
        sqlx::query_as::<_, DiaryPageSummary>(
            "SELECT p.id, p.page_date,
                    COUNT(e.id) AS entry_count,
                    AVG(e.mood_score)::FLOAT8 AS average_mood
             FROM diary_pages p
             LEFT JOIN diary_entries e ON e.page_id = p.id
             WHERE p.user_id = $1
             GROUP BY p.id, p.page_date
             ORDER BY p.page_date DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Delete a user's page (entries cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM diary_pages WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
