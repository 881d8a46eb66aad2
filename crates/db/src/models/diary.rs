//! Diary page and entry models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `diary_pages` table (one per user per day).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiaryPage {
    pub id: DbId,
    pub user_id: DbId,
    pub page_date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A page listing row with aggregated entry data.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiaryPageSummary {
    pub id: DbId,
    pub page_date: NaiveDate,
    pub entry_count: i64,
    pub average_mood: Option<f64>,
}

/// A row from the `diary_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiaryEntry {
    pub id: DbId,
    pub page_id: DbId,
    pub user_id: DbId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood_score: Option<i16>,
    pub mood_label: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One day of the mood summary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MoodDay {
    pub page_date: NaiveDate,
    pub average_mood: f64,
    pub entry_count: i64,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Request body for creating an entry. `page_date` defaults to today (UTC).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiaryEntry {
    pub page_date: Option<NaiveDate>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood_score: Option<i16>,
    pub mood_label: Option<String>,
}

/// Partial update of an entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiaryEntry {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood_score: Option<i16>,
    pub mood_label: Option<String>,
}
