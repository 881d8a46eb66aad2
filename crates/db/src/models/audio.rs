//! Audio library models: files, categories and moods.

use serde::{Deserialize, Serialize};
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Audio files
// ---------------------------------------------------------------------------

/// A row from the `audio_files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AudioFile {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub duration_secs: Option<i32>,
    pub category_id: Option<DbId>,
    pub mood_id: Option<DbId>,
    pub is_premium: bool,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Metadata recorded after an object has been stored.
#[derive(Debug, Clone)]
pub struct CreateAudioFile {
    pub title: String,
    pub description: Option<String>,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub duration_secs: Option<i32>,
    pub category_id: Option<DbId>,
    pub mood_id: Option<DbId>,
    pub is_premium: bool,
    pub uploaded_by: Option<DbId>,
}

/// Admin metadata patch. The stored object itself is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAudioFile {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_secs: Option<i32>,
    pub category_id: Option<DbId>,
    pub mood_id: Option<DbId>,
    pub is_premium: Option<bool>,
}

/// Library listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFilter {
    pub category_id: Option<DbId>,
    pub mood_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A row from the `audio_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AudioCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAudioCategory {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAudioCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Moods
// ---------------------------------------------------------------------------

/// A row from the `audio_moods` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AudioMood {
    pub id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAudioMood {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAudioMood {
    pub name: Option<String>,
    pub color: Option<String>,
}
