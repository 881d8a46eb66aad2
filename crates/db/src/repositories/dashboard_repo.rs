//! Aggregate queries for the admin dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Count the headline entities in one round-trip.
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE is_active) AS active_users,
                (SELECT COUNT(*) FROM users
                  WHERE plan = 'premium'
                    AND (subscription_expires_at IS NULL OR subscription_expires_at > NOW())
                ) AS premium_users,
                (SELECT COUNT(*) FROM diary_pages) AS diary_pages,
                (SELECT COUNT(*) FROM diary_entries) AS diary_entries,
                (SELECT COUNT(*) FROM audio_files) AS audio_files,
                (SELECT COUNT(*) FROM groups) AS groups",
        )
        .fetch_one(pool)
        .await
    }
}
