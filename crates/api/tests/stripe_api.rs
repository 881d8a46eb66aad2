//! Integration tests for billing: checkout and portal sessions through the
//! payment gateway, and the signed webhook feed that keeps user plans in sync.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, post_json_auth, post_webhook, user_with_token, WEBHOOK_SECRET};
use serene_core::billing::signature_header;
use serene_db::models::pricing_plan::UpdatePricingPlan;
use serene_db::repositories::{PricingPlanRepo, UserRepo};
use sqlx::PgPool;

fn signed(payload: &[u8]) -> String {
    signature_header(payload, WEBHOOK_SECRET, Utc::now().timestamp())
}

fn event(id: &str, event_type: &str, object: serde_json::Value) -> Vec<u8> {
    event_created_at(id, event_type, object, Utc::now().timestamp())
}

fn event_created_at(id: &str, event_type: &str, object: serde_json::Value, created: i64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": id,
        "type": event_type,
        "created": created,
        "data": { "object": object },
    }))
    .unwrap()
}

async fn set_customer(pool: &PgPool, user_id: i64, customer_id: &str) {
    UserRepo::set_stripe_customer(pool, user_id, customer_id)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Webhook verification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_requires_signature(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let payload = event("evt_1", "customer.created", serde_json::json!({}));

    let response = post_webhook(test.app(), &payload, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let forged = signature_header(&payload, "whsec_wrong", Utc::now().timestamp());
    let response = post_webhook(test.app(), &payload, Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stale = signature_header(&payload, WEBHOOK_SECRET, Utc::now().timestamp() - 3600);
    let response = post_webhook(test.app(), &payload, Some(&stale)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_rejects_malformed_body(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let payload = b"{not json".to_vec();
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unhandled_event_is_acknowledged(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let payload = event("evt_other", "customer.created", serde_json::json!({ "id": "cus_1" }));
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["received"], true);
    assert_eq!(json["duplicate"], false);
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checkout_completed_upgrades_user(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "buyer@example.com", "user").await;

    let payload = event(
        "evt_checkout",
        "checkout.session.completed",
        serde_json::json!({
            "id": "cs_1",
            "customer": "cus_buyer",
            "subscription": "sub_1",
            "client_reference_id": user.id.to_string(),
            "metadata": { "user_id": user.id.to_string() },
        }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "premium");
    assert_eq!(updated.stripe_customer_id.as_deref(), Some("cus_buyer"));
    assert_eq!(updated.subscription_id.as_deref(), Some("sub_1"));
    assert_eq!(updated.subscription_status.as_deref(), Some("active"));
    assert!(updated.is_premium(Utc::now()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_subscription_update_falls_back_to_customer_id(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "renewer@example.com", "user").await;
    set_customer(&pool, user.id, "cus_renewer").await;

    let period_end = Utc::now().timestamp() + 30 * 24 * 3600;
    let payload = event(
        "evt_sub_updated",
        "customer.subscription.updated",
        serde_json::json!({
            "id": "sub_2",
            "customer": "cus_renewer",
            "status": "active",
            "current_period_end": period_end,
            "metadata": {},
        }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "premium");
    assert_eq!(updated.subscription_id.as_deref(), Some("sub_2"));
    assert_eq!(
        updated.subscription_expires_at.map(|t| t.timestamp()),
        Some(period_end)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_subscription_deleted_downgrades(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "leaver@example.com", "user").await;
    set_customer(&pool, user.id, "cus_leaver").await;

    let created = event(
        "evt_sub_created",
        "customer.subscription.created",
        serde_json::json!({
            "id": "sub_3",
            "customer": "cus_leaver",
            "status": "active",
            "metadata": { "user_id": user.id.to_string() },
        }),
    );
    post_webhook(test.app(), &created, Some(&signed(&created))).await;

    let deleted = event(
        "evt_sub_deleted",
        "customer.subscription.deleted",
        serde_json::json!({
            "id": "sub_3",
            "customer": "cus_leaver",
            "status": "canceled",
            "metadata": { "user_id": user.id.to_string() },
        }),
    );
    let response = post_webhook(test.app(), &deleted, Some(&signed(&deleted))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "free");
    assert_eq!(updated.subscription_status.as_deref(), Some("canceled"));
    assert!(updated.subscription_id.is_none());
    assert!(updated.subscription_expires_at.is_none());
    // The customer survives cancellation so the user can resubscribe.
    assert_eq!(updated.stripe_customer_id.as_deref(), Some("cus_leaver"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_failure_keeps_access(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "late@example.com", "user").await;
    sqlx::query(
        "UPDATE users SET plan = 'premium', stripe_customer_id = 'cus_late', \
         subscription_id = 'sub_4', subscription_status = 'active' WHERE id = $1",
    )
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let payload = event(
        "evt_invoice_failed",
        "invoice.payment_failed",
        serde_json::json!({ "customer": "cus_late", "subscription": "sub_4" }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "premium");
    assert_eq!(updated.subscription_status.as_deref(), Some("past_due"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_paid_invoice_extends_expiry_to_line_period_end(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "renewal@example.com", "user").await;
    sqlx::query(
        "UPDATE users SET plan = 'premium', stripe_customer_id = 'cus_renewal', \
         subscription_id = 'sub_6', subscription_status = 'past_due' WHERE id = $1",
    )
    .bind(user.id)
    .execute(&pool)
    .await
    .unwrap();

    let now = Utc::now().timestamp();
    let first_end = now + 30 * 24 * 3600;
    let payload = event(
        "evt_invoice_paid",
        "invoice.paid",
        serde_json::json!({
            "customer": "cus_renewal",
            "subscription": "sub_6",
            "period_end": now,
            "lines": { "data": [ { "period": { "end": first_end } } ] },
        }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "premium");
    assert_eq!(updated.subscription_status.as_deref(), Some("active"));
    assert_eq!(
        updated.subscription_expires_at.map(|t| t.timestamp()),
        Some(first_end)
    );

    let next_end = first_end + 30 * 24 * 3600;
    let payload = event(
        "evt_invoice_succeeded",
        "invoice.payment_succeeded",
        serde_json::json!({
            "customer": "cus_renewal",
            "subscription": "sub_6",
            "lines": { "data": [ { "period": { "end": next_end } } ] },
        }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(
        updated.subscription_expires_at.map(|t| t.timestamp()),
        Some(next_end)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invoice_after_cancellation_does_not_regrant(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "canceled@example.com", "user").await;
    set_customer(&pool, user.id, "cus_canceled").await;

    let checkout = event(
        "evt_c_checkout",
        "checkout.session.completed",
        serde_json::json!({
            "customer": "cus_canceled",
            "subscription": "sub_1",
            "metadata": { "user_id": user.id.to_string() },
        }),
    );
    post_webhook(test.app(), &checkout, Some(&signed(&checkout))).await;

    let deleted = event(
        "evt_c_deleted",
        "customer.subscription.deleted",
        serde_json::json!({ "id": "sub_1", "customer": "cus_canceled", "status": "canceled" }),
    );
    let response = post_webhook(test.app(), &deleted, Some(&signed(&deleted))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Final invoice delivered after the deletion.
    let late_invoice = event(
        "evt_c_invoice",
        "invoice.paid",
        serde_json::json!({
            "customer": "cus_canceled",
            "subscription": "sub_1",
            "lines": { "data": [ { "period": { "end": Utc::now().timestamp() + 30 * 24 * 3600 } } ] },
        }),
    );
    let response = post_webhook(test.app(), &late_invoice, Some(&signed(&late_invoice))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "free");
    assert!(updated.subscription_id.is_none());
    assert_eq!(updated.subscription_status.as_deref(), Some("canceled"));
    assert!(!updated.is_premium(Utc::now()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_older_subscription_update_is_skipped(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "reordered@example.com", "user").await;
    set_customer(&pool, user.id, "cus_reordered").await;
    let now = Utc::now().timestamp();

    let deleted = event_created_at(
        "evt_r_deleted",
        "customer.subscription.deleted",
        serde_json::json!({ "id": "sub_9", "customer": "cus_reordered", "status": "canceled" }),
        now,
    );
    post_webhook(test.app(), &deleted, Some(&signed(&deleted))).await;

    // Created before the deletion but delivered after it.
    let stale = event_created_at(
        "evt_r_updated",
        "customer.subscription.updated",
        serde_json::json!({
            "id": "sub_9",
            "customer": "cus_reordered",
            "status": "active",
            "current_period_end": now + 30 * 24 * 3600,
        }),
        now - 60,
    );
    let response = post_webhook(test.app(), &stale, Some(&signed(&stale))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["duplicate"], false);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "free");
    assert!(updated.subscription_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_event_is_not_reapplied(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, _token) = user_with_token(&test, "twice@example.com", "user").await;

    let payload = event(
        "evt_dup",
        "checkout.session.completed",
        serde_json::json!({
            "customer": "cus_twice",
            "subscription": "sub_5",
            "metadata": { "user_id": user.id.to_string() },
        }),
    );
    let first = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(body_json(first).await["duplicate"], false);

    // An admin downgrade in between must survive a redelivery.
    sqlx::query("UPDATE users SET plan = 'free' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let second = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["duplicate"], true);

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.plan, "free");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_for_unknown_user_is_acknowledged(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let payload = event(
        "evt_stranger",
        "customer.subscription.deleted",
        serde_json::json!({ "id": "sub_x", "customer": "cus_nobody", "status": "canceled" }),
    );
    let response = post_webhook(test.app(), &payload, Some(&signed(&payload))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Checkout / portal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checkout_creates_customer_once(pool: PgPool) {
    let premium = PricingPlanRepo::find_active_by_slug(&pool, "premium-monthly")
        .await
        .unwrap()
        .unwrap();
    let update = UpdatePricingPlan {
        stripe_price_id: Some("price_premium".into()),
        ..Default::default()
    };
    PricingPlanRepo::update(&pool, premium.id, &update).await.unwrap();

    let test = common::build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&test, "shopper@example.com", "user").await;
    let body = serde_json::json!({ "plan_slug": "premium-monthly" });

    let response = post_json_auth(test.app(), "/api/stripe/checkout", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "cs_test_1");
    assert_eq!(json["data"]["url"], "https://checkout.test/cs_test_1");

    let response = post_json_auth(test.app(), "/api/stripe/checkout", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let customers = test.payments.customers.lock().unwrap().clone();
    assert_eq!(customers, vec![("shopper@example.com".to_string(), user.id)]);

    let checkouts = test.payments.checkouts.lock().unwrap().clone();
    assert_eq!(checkouts.len(), 2);
    assert_eq!(checkouts[0].customer_id, format!("cus_test_{}", user.id));
    assert_eq!(checkouts[0].price_id, "price_premium");
    assert_eq!(checkouts[0].user_id, user.id);
    assert!(checkouts[0].success_url.contains("{CHECKOUT_SESSION_ID}"));

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.stripe_customer_id, Some(format!("cus_test_{}", user.id)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checkout_rejects_unpurchasable_plans(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&test, "picky@example.com", "user").await;

    let free = serde_json::json!({ "plan_slug": "free" });
    let response = post_json_auth(test.app(), "/api/stripe/checkout", free, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Seeded premium plan has no Stripe price configured.
    let premium = serde_json::json!({ "plan_slug": "premium-monthly" });
    let response = post_json_auth(test.app(), "/api/stripe/checkout", premium.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = serde_json::json!({ "plan_slug": "platinum" });
    let response = post_json_auth(test.app(), "/api/stripe/checkout", missing, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    sqlx::query("UPDATE users SET plan = 'premium' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let response = post_json_auth(test.app(), "/api/stripe/checkout", premium, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert!(test.payments.customers.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_portal_requires_customer(pool: PgPool) {
    let test = common::build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&test, "portal@example.com", "user").await;

    let response =
        post_json_auth(test.app(), "/api/stripe/portal", serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    set_customer(&pool, user.id, "cus_portal").await;
    let response =
        post_json_auth(test.app(), "/api/stripe/portal", serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        test.payments.portals.lock().unwrap().clone(),
        vec!["cus_portal".to_string()]
    );
}
