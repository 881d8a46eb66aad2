//! Handlers for subscription billing (`/stripe`).
//!
//! Checkout and portal sessions are created through the
//! [`PaymentGateway`](crate::billing::PaymentGateway). The webhook endpoint
//! verifies the signature, records the event id for idempotency, reduces the
//! event to a [`SubscriptionChange`] and applies it to the user row.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serene_core::billing::{parse_event, reconcile, verify_signature, SubscriptionChange};
use serene_core::error::CoreError;
use serene_core::plans::PLAN_PREMIUM;
use serene_db::models::user::User;
use serene_db::repositories::{PricingPlanRepo, StripeEventRepo, UserRepo};

use super::auth::load_user;
use crate::billing::{CheckoutRequest, HostedSession};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Request body for `POST /stripe/checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    /// Slug of the pricing plan to subscribe to.
    pub plan_slug: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    /// The event id was already processed.
    pub duplicate: bool,
}

// ---------------------------------------------------------------------------
// Checkout / portal
// ---------------------------------------------------------------------------

/// POST /api/stripe/checkout
///
/// Start a hosted checkout for a premium plan. Creates the Stripe customer on
/// first use.
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CheckoutBody>,
) -> AppResult<Json<DataResponse<HostedSession>>> {
    let user = load_user(&state, auth.user_id).await?;
    if user.is_premium(Utc::now()) {
        return Err(AppError::Core(CoreError::Conflict(
            "You already have an active premium subscription".into(),
        )));
    }

    let plan = PricingPlanRepo::find_active_by_slug(&state.pool, &input.plan_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No active plan '{}'", input.plan_slug)))?;
    if plan.tier != PLAN_PREMIUM {
        return Err(AppError::BadRequest(format!(
            "Plan '{}' is not a paid plan",
            plan.slug
        )));
    }
    let price_id = plan.stripe_price_id.clone().ok_or_else(|| {
        AppError::BadRequest(format!("Plan '{}' is not available for purchase", plan.slug))
    })?;

    let customer_id = ensure_customer(&state, &user).await?;
    let app_url = &state.config.app_url;
    let request = CheckoutRequest {
        customer_id,
        price_id,
        user_id: user.id,
        success_url: format!("{app_url}/billing/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{app_url}/pricing"),
    };

    let session = state.payments.create_checkout_session(&request).await?;
    tracing::info!(
        user_id = user.id,
        plan = %plan.slug,
        session_id = %session.id,
        "Checkout session created",
    );

    Ok(Json(DataResponse { data: session }))
}

/// POST /api/stripe/portal
///
/// Open the billing portal. Requires a Stripe customer, i.e. a past checkout.
pub async fn create_portal(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<HostedSession>>> {
    let user = load_user(&state, auth.user_id).await?;
    let customer_id = user.stripe_customer_id.as_deref().ok_or_else(|| {
        AppError::BadRequest("No billing account exists for this user yet".into())
    })?;

    let return_url = format!("{}/profile", state.config.app_url);
    let session = state
        .payments
        .create_portal_session(customer_id, &return_url)
        .await?;

    tracing::info!(user_id = user.id, "Billing portal session created");
    Ok(Json(DataResponse { data: session }))
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// POST /api/stripe/webhooks
///
/// Signed event feed. Bad or missing signatures are rejected with 400.
/// Changes older than the last one applied to the user, and invoice events
/// for a subscription the user no longer holds, are acknowledged and skipped.
/// Events for unknown users and event types we do not act on are
/// acknowledged with 200 so Stripe stops retrying them. A failure while
/// applying a change un-records the event and returns 500 so Stripe retries.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    let stripe = &state.config.stripe;
    verify_signature(
        &body,
        signature,
        &stripe.webhook_secret,
        Utc::now().timestamp(),
        stripe.webhook_tolerance_secs,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook signature");
        AppError::BadRequest(format!("Invalid webhook signature: {e}"))
    })?;

    let (event, billing_event) =
        parse_event(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !StripeEventRepo::record(&state.pool, &event.id, &event.event_type).await? {
        tracing::debug!(event_id = %event.id, "Duplicate webhook event ignored");
        return Ok(Json(WebhookAck {
            received: true,
            duplicate: true,
        }));
    }

    let Some(change) = reconcile(&billing_event).map(|c| c.at_event_time(event.created)) else {
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook event ignored");
        return Ok(Json(WebhookAck {
            received: true,
            duplicate: false,
        }));
    };

    if let Err(err) = apply_change(&state, &event.id, &change).await {
        if let Err(forget_err) = StripeEventRepo::forget(&state.pool, &event.id).await {
            tracing::error!(event_id = %event.id, error = %forget_err, "Failed to un-record webhook event");
        }
        return Err(err);
    }

    Ok(Json(WebhookAck {
        received: true,
        duplicate: false,
    }))
}

/// Resolve the user a change belongs to and write it.
async fn apply_change(state: &AppState, event_id: &str, change: &SubscriptionChange) -> AppResult<()> {
    let Some(user) = resolve_user(state, change).await? else {
        tracing::warn!(
            event_id,
            user_id = ?change.user.user_id,
            customer_id = ?change.user.customer_id,
            "Webhook event does not match any user",
        );
        return Ok(());
    };

    match UserRepo::apply_subscription_change(&state.pool, user.id, change).await? {
        Some(updated) => tracing::info!(
            event_id,
            user_id = updated.id,
            plan = %updated.plan,
            status = ?updated.subscription_status,
            expires_at = ?updated.subscription_expires_at,
            "Subscription state updated",
        ),
        None => tracing::info!(
            event_id,
            user_id = user.id,
            event_at = ?change.event_at,
            for_subscription = ?change.for_subscription,
            current_subscription = ?user.subscription_id,
            "Stale or unrelated billing event skipped",
        ),
    }
    Ok(())
}

/// Find the user by our metadata id, falling back to the Stripe customer id.
async fn resolve_user(state: &AppState, change: &SubscriptionChange) -> AppResult<Option<User>> {
    if let Some(user_id) = change.user.user_id {
        if let Some(user) = UserRepo::find_by_id(&state.pool, user_id).await? {
            return Ok(Some(user));
        }
    }
    match change.user.customer_id.as_deref() {
        Some(customer_id) => Ok(UserRepo::find_by_stripe_customer(&state.pool, customer_id).await?),
        None => Ok(None),
    }
}

/// The user's Stripe customer id, creating the customer if needed.
async fn ensure_customer(state: &AppState, user: &User) -> AppResult<String> {
    if let Some(existing) = &user.stripe_customer_id {
        return Ok(existing.clone());
    }
    let customer_id = state.payments.create_customer(&user.email, user.id).await?;
    UserRepo::set_stripe_customer(&state.pool, user.id, &customer_id).await?;
    Ok(customer_id)
}
