//! Pricing plan catalogue model and DTOs.

use serde::{Deserialize, Serialize};
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `pricing_plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingPlan {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    /// Which `users.plan` value a purchase of this plan grants.
    pub tier: String,
    pub price_cents: i32,
    pub currency: String,
    pub billing_interval: String,
    pub stripe_price_id: Option<String>,
    /// Diary page quota; `None` means unlimited.
    pub max_diary_pages: Option<i32>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePricingPlan {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub tier: String,
    pub price_cents: i32,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub stripe_price_id: Option<String>,
    pub max_diary_pages: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePricingPlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub stripe_price_id: Option<String>,
    pub max_diary_pages: Option<i32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
