//! Repository for the `pricing_plans` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::pricing_plan::{CreatePricingPlan, PricingPlan, UpdatePricingPlan};

const COLUMNS: &str = "id, slug, name, description, tier, price_cents, currency, \
                        billing_interval, stripe_price_id, max_diary_pages, is_active, \
                        sort_order, created_at, updated_at";

/// Provides CRUD operations for the pricing catalogue.
pub struct PricingPlanRepo;

impl PricingPlanRepo {
    pub async fn create(pool: &PgPool, input: &CreatePricingPlan) -> Result<PricingPlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO pricing_plans
                (slug, name, description, tier, price_cents, currency, billing_interval,
                 stripe_price_id, max_diary_pages, sort_order)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'eur'), COALESCE($7, 'month'),
                     $8, $9, COALESCE($10, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.tier)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.billing_interval)
            .bind(&input.stripe_price_id)
            .bind(input.max_diary_pages)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PricingPlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pricing_plans WHERE id = $1");
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active plan by slug.
    pub async fn find_active_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<PricingPlan>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM pricing_plans WHERE slug = $1 AND is_active = true");
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List plans in display order. Inactive plans are included only when asked.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<PricingPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pricing_plans
             WHERE is_active = true OR $1
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// The diary page limit of the first active plan for a tier.
    ///
    /// Outer `None`: no active plan for the tier. Inner `None`: unlimited.
    pub async fn page_limit_for_tier(
        pool: &PgPool,
        tier: &str,
    ) -> Result<Option<Option<i32>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT max_diary_pages FROM pricing_plans
             WHERE tier = $1 AND is_active = true
             ORDER BY sort_order, id
             LIMIT 1",
        )
        .bind(tier)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePricingPlan,
    ) -> Result<Option<PricingPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE pricing_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                currency = COALESCE($5, currency),
                billing_interval = COALESCE($6, billing_interval),
                stripe_price_id = COALESCE($7, stripe_price_id),
                max_diary_pages = COALESCE($8, max_diary_pages),
                is_active = COALESCE($9, is_active),
                sort_order = COALESCE($10, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.billing_interval)
            .bind(&input.stripe_price_id)
            .bind(input.max_diary_pages)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a plan so existing subscribers keep their references.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE pricing_plans SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
