//! Repository for the `users` table.

use serene_core::billing::SubscriptionChange;
use serene_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, role, plan, stripe_customer_id, \
                        subscription_id, subscription_status, subscription_expires_at, \
                        is_active, failed_login_count, locked_until, last_login_at, \
                        created_at, updated_at";

/// Provides CRUD and subscription operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by (already normalized) email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the user linked to a Stripe customer id.
    pub async fn find_by_stripe_customer(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE stripe_customer_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// List users, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Admin update. Only non-`None` fields in `input` are applied.
    ///
    /// Setting `plan` also clears `subscription_expires_at`: an admin-set
    /// plan is open-ended until the next billing event or admin change.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                role = COALESCE($2, role),
                plan = COALESCE($3, plan),
                subscription_expires_at = CASE WHEN $3::TEXT IS NULL
                                               THEN subscription_expires_at END,
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.role)
            .bind(&input.plan)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Remember the Stripe customer created for a user.
    pub async fn set_stripe_customer(
        pool: &PgPool,
        id: DbId,
        customer_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET stripe_customer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(customer_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Apply a reconciled subscription change to a user row.
    ///
    /// `None` fields keep their current value. When `clear_subscription` is
    /// set, the subscription id and expiry are nulled after the other updates.
    ///
    /// Returns `None` without writing when the row is missing, when a newer
    /// event was already applied (`event_at`), or when the change is bound to
    /// a subscription (`for_subscription`) that is not the user's current one.
    /// A user who never had a subscription accepts a bound change.
    pub async fn apply_subscription_change(
        pool: &PgPool,
        id: DbId,
        change: &SubscriptionChange,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                plan = COALESCE($2, plan),
                stripe_customer_id = COALESCE($3, stripe_customer_id),
                subscription_id = CASE WHEN $6 THEN NULL ELSE COALESCE($4, subscription_id) END,
                subscription_status = COALESCE($5, subscription_status),
                subscription_expires_at = CASE WHEN $6 THEN NULL
                                               ELSE COALESCE($7, subscription_expires_at) END,
                subscription_event_at = GREATEST(subscription_event_at, $8)
             WHERE id = $1
               AND ($8::TIMESTAMPTZ IS NULL
                    OR subscription_event_at IS NULL
                    OR subscription_event_at <= $8)
               AND ($9::TEXT IS NULL
                    OR subscription_id = $9
                    OR (subscription_id IS NULL AND subscription_status IS NULL))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(change.plan)
            .bind(&change.user.customer_id)
            .bind(&change.subscription_id)
            .bind(&change.subscription_status)
            .bind(change.clear_subscription)
            .bind(change.expires_at)
            .bind(change.event_at)
            .bind(&change.for_subscription)
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
