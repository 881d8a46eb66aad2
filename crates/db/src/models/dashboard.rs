//! Admin dashboard aggregate counts.

use serde::Serialize;
use sqlx::FromRow;

/// Headline numbers for the admin console.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_users: i64,
    pub premium_users: i64,
    pub diary_pages: i64,
    pub diary_entries: i64,
    pub audio_files: i64,
    pub groups: i64,
}
