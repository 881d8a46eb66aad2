//! Subscription plan names, premium status and diary quota checks.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Plan assigned to every new account.
pub const PLAN_FREE: &str = "free";
/// Paid plan unlocking premium audio and unlimited diary pages.
pub const PLAN_PREMIUM: &str = "premium";

/// All valid plan values for `users.plan`.
pub const VALID_PLANS: &[&str] = &[PLAN_FREE, PLAN_PREMIUM];

/// Validate that `plan` is one of [`VALID_PLANS`].
pub fn validate_plan(plan: &str) -> Result<(), CoreError> {
    if VALID_PLANS.contains(&plan) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid plan '{plan}'. Must be one of: {VALID_PLANS:?}"
        )))
    }
}

/// Whether a user with the given plan columns currently has premium access.
///
/// A premium plan without an expiry is open-ended (e.g. granted by an admin).
pub fn is_premium_active(plan: &str, expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    plan == PLAN_PREMIUM && expires_at.is_none_or(|exp| exp > now)
}

/// The plan slug that applies right now, downgrading an expired premium plan.
pub fn effective_plan(plan: &str, expires_at: Option<Timestamp>, now: Timestamp) -> &'static str {
    if is_premium_active(plan, expires_at, now) {
        PLAN_PREMIUM
    } else {
        PLAN_FREE
    }
}

/// Check that creating one more diary page stays within `limit`.
///
/// `limit = None` means the plan is unlimited.
pub fn check_page_quota(pages_used: i64, limit: Option<i32>) -> Result<(), CoreError> {
    match limit {
        Some(max) if pages_used >= i64::from(max) => Err(CoreError::QuotaExceeded(format!(
            "Your plan allows {max} diary pages. Upgrade to premium for unlimited pages."
        ))),
        _ => Ok(()),
    }
}

/// Page limit applied to free accounts when the catalogue has no free plan row.
pub const DEFAULT_FREE_PAGE_LIMIT: i32 = 30;

/// Resolve the diary page limit for a plan tier.
///
/// `catalogue` is the `max_diary_pages` column of the tier's active pricing
/// plan, or `None` when no such plan exists.
pub fn page_limit(tier: &str, catalogue: Option<Option<i32>>) -> Option<i32> {
    match catalogue {
        Some(limit) => limit,
        None if tier == PLAN_PREMIUM => None,
        None => Some(DEFAULT_FREE_PAGE_LIMIT),
    }
}

/// Validate a pricing-plan slug: lowercase ASCII letters, digits and dashes.
pub fn validate_plan_slug(slug: &str) -> Result<(), CoreError> {
    let ok = !slug.is_empty()
        && slug.len() <= 50
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid plan slug '{slug}'. Use 1-50 lowercase letters, digits or dashes"
        )))
    }
}

/// Valid billing intervals for pricing plans.
pub const VALID_INTERVALS: &[&str] = &["month", "year"];

/// Validate the billing interval and price of a pricing plan.
pub fn validate_pricing(price_cents: i32, interval: &str) -> Result<(), CoreError> {
    if price_cents < 0 {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    if !VALID_INTERVALS.contains(&interval) {
        return Err(CoreError::Validation(format!(
            "Invalid billing interval '{interval}'. Must be one of: {VALID_INTERVALS:?}"
        )));
    }
    Ok(())
}
