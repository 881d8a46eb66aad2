//! Periodic purge of dead refresh-token sessions.

use std::time::Duration;

use chrono::Utc;
use serene_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the purge runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Revoked sessions are kept this long before deletion.
pub const REVOKED_RETENTION_DAYS: i64 = 7;

/// Delete expired sessions and sessions revoked more than
/// [`REVOKED_RETENTION_DAYS`] ago. Returns the number of rows removed.
pub async fn purge_once(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::days(REVOKED_RETENTION_DAYS);
    SessionRepo::purge_stale(pool, cutoff).await
}

/// Run [`purge_once`] every [`CLEANUP_INTERVAL`] until `cancel` fires.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        retention_days = REVOKED_RETENTION_DAYS,
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => match purge_once(&pool).await {
                Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged sessions"),
                Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
            },
        }
    }
}
