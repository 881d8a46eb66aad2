//! HTTP-level integration tests for the diary: entry creation, page quota,
//! ownership scoping and the mood summary.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{body_json, delete_auth, get, get_auth, post_json_auth, put_json_auth, user_with_token};
use serene_db::models::pricing_plan::UpdatePricingPlan;
use serene_db::repositories::PricingPlanRepo;
use sqlx::PgPool;

fn entry(date: &str, title: &str, mood: i16) -> serde_json::Value {
    serde_json::json!({
        "page_date": date,
        "title": title,
        "content": "Wrote a little.",
        "mood_score": mood,
        "mood_label": "calm",
    })
}

async fn set_free_quota(pool: &PgPool, max: i32) {
    let free = PricingPlanRepo::find_active_by_slug(pool, "free")
        .await
        .unwrap()
        .expect("free plan is seeded");
    let update = UpdatePricingPlan {
        max_diary_pages: Some(max),
        ..Default::default()
    };
    PricingPlanRepo::update(pool, free.id, &update).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_diary_requires_auth(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let response = get(test.app(), "/api/diary/pages").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_entry_defaults_to_today(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "writer@example.com", "user").await;

    let body = serde_json::json!({ "content": "First entry", "mood_score": 4 });
    let response = post_json_auth(test.app(), "/api/diary/entries", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "First entry");

    let today = Utc::now().date_naive();
    let uri = format!("/api/diary/pages/{today}");
    let json = body_json(get_auth(test.app(), &uri, &token).await).await;
    assert_eq!(json["data"]["page_date"], today.to_string());
    assert_eq!(json["data"]["entries"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entries_on_same_day_share_a_page(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "sameday@example.com", "user").await;

    for title in ["Morning", "Evening"] {
        let response = post_json_auth(
            test.app(),
            "/api/diary/entries",
            entry("2024-05-01", title, 3),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get_auth(test.app(), "/api/diary/pages", &token).await).await;
    let pages = json["data"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["entry_count"], 2);
    assert_eq!(json["offset"], 0);
    assert_eq!(json["has_more"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_page_listing_reports_window(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "pager@example.com", "user").await;

    for date in ["2024-05-01", "2024-05-02", "2024-05-03"] {
        let response =
            post_json_auth(test.app(), "/api/diary/entries", entry(date, "Day", 3), &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get_auth(test.app(), "/api/diary/pages?limit=2", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["has_more"], true);

    let uri = "/api/diary/pages?limit=2&offset=2";
    let json = body_json(get_auth(test.app(), uri, &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["offset"], 2);
    assert_eq!(json["has_more"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_entry_is_rejected(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "invalid@example.com", "user").await;

    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry("2024-05-01", "Bad mood score", 9),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({ "mood_score": 3 });
    let response = post_json_auth(test.app(), "/api/diary/entries", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let far_future = Utc::now().date_naive() + Days::new(10);
    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry(&far_future.to_string(), "Later", 3),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_free_quota_blocks_new_pages_only(pool: PgPool) {
    set_free_quota(&pool, 2).await;
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "quota@example.com", "user").await;

    for date in ["2024-01-01", "2024-01-02"] {
        let response =
            post_json_auth(test.app(), "/api/diary/entries", entry(date, "Day", 3), &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry("2024-01-03", "One too many", 3),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "QUOTA_EXCEEDED");

    // Writing on an existing page does not consume quota.
    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry("2024-01-02", "Another note", 4),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_premium_user_is_not_limited(pool: PgPool) {
    set_free_quota(&pool, 1).await;
    let test = common::build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&test, "premium@example.com", "user").await;
    sqlx::query("UPDATE users SET plan = 'premium' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    for date in ["2024-02-01", "2024-02-02", "2024-02-03"] {
        let response =
            post_json_auth(test.app(), "/api/diary/entries", entry(date, "Day", 5), &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entries_are_scoped_to_owner(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_alice, alice) = user_with_token(&test, "alice@example.com", "user").await;
    let (_bob, bob) = user_with_token(&test, "bob@example.com", "user").await;

    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry("2024-03-01", "Private", 2),
        &alice,
    )
    .await;
    let entry_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/diary/entries/{entry_id}");

    assert_eq!(get_auth(test.app(), &uri, &bob).await.status(), StatusCode::NOT_FOUND);
    let response = put_json_auth(test.app(), &uri, serde_json::json!({ "title": "Mine now" }), &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete_auth(test.app(), &uri, &bob).await.status(), StatusCode::NOT_FOUND);

    let response = get_auth(test.app(), "/api/diary/pages/2024-03-01", &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(get_auth(test.app(), &uri, &alice).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_entry(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "editor@example.com", "user").await;

    let response = post_json_auth(
        test.app(),
        "/api/diary/entries",
        entry("2024-04-01", "Draft", 2),
        &token,
    )
    .await;
    let entry_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/diary/entries/{entry_id}");

    let response = put_json_auth(
        test.app(),
        &uri,
        serde_json::json!({ "mood_score": 5, "mood_label": "happy" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["mood_score"], 5);
    assert_eq!(json["data"]["title"], "Draft");

    assert_eq!(delete_auth(test.app(), &uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_auth(test.app(), &uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_page_frees_quota(pool: PgPool) {
    set_free_quota(&pool, 1).await;
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "cleaner@example.com", "user").await;

    post_json_auth(test.app(), "/api/diary/entries", entry("2024-06-01", "Old", 3), &token).await;
    let json = body_json(get_auth(test.app(), "/api/diary/pages", &token).await).await;
    let page_id = json["data"][0]["id"].as_i64().unwrap();

    let response = delete_auth(test.app(), &format!("/api/diary/pages/{page_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response =
        post_json_auth(test.app(), "/api/diary/entries", entry("2024-06-02", "New", 3), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mood_summary_averages_per_day(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let (_user, token) = user_with_token(&test, "moods@example.com", "user").await;

    for (date, mood) in [("2024-07-01", 2), ("2024-07-01", 4), ("2024-07-03", 5)] {
        post_json_auth(test.app(), "/api/diary/entries", entry(date, "Mood", mood), &token).await;
    }

    let uri = "/api/diary/moods?from=2024-07-01&to=2024-07-31";
    let json = body_json(get_auth(test.app(), uri, &token).await).await;
    let days = json["data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["page_date"], "2024-07-01");
    assert_eq!(days[0]["average_mood"], 3.0);
    assert_eq!(days[0]["entry_count"], 2);
    assert_eq!(days[1]["average_mood"], 5.0);

    let response = get_auth(test.app(), "/api/diary/moods?from=2024-08-01&to=2024-07-01", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
