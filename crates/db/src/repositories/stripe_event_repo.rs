//! Repository for the `stripe_events` idempotency log.

use sqlx::PgPool;

/// Records which webhook events have already been applied.
pub struct StripeEventRepo;

impl StripeEventRepo {
    /// Record an event id. Returns `false` if it was already recorded.
    pub async fn record(pool: &PgPool, id: &str, event_type: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO stripe_events (id, event_type) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(event_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Forget an event so a redelivery is processed again.
    ///
    /// Called when applying the event failed after it was recorded.
    pub async fn forget(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM stripe_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
