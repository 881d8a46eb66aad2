//! Repository tests for diary pages and entries.
//!
//! Covers page-per-day uniqueness, owner scoping, cascade deletes and the
//! mood aggregation used by the summary endpoint.

use chrono::NaiveDate;
use serene_db::models::diary::{CreateDiaryEntry, UpdateDiaryEntry};
use serene_db::models::user::CreateUser;
use serene_db::repositories::{DiaryEntryRepo, DiaryPageRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: "user".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_entry(content: &str, mood: Option<i16>) -> CreateDiaryEntry {
    CreateDiaryEntry {
        page_date: None,
        title: None,
        content: Some(content.to_string()),
        mood_score: mood,
        mood_label: None,
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_or_create_is_idempotent(pool: PgPool) {
    let user = new_user(&pool, "pages@example.com").await;

    let (first, inserted) = DiaryPageRepo::find_or_create(&pool, user, day("2024-01-10"))
        .await
        .unwrap();
    assert!(inserted);

    let (second, inserted) = DiaryPageRepo::find_or_create(&pool, user, day("2024-01-10"))
        .await
        .unwrap();
    assert!(!inserted);
    assert_eq!(first.id, second.id);

    assert_eq!(DiaryPageRepo::count_for_user(&pool, user).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pages_are_per_user(pool: PgPool) {
    let alice = new_user(&pool, "alice@example.com").await;
    let bob = new_user(&pool, "bob@example.com").await;

    let (page, _) = DiaryPageRepo::find_or_create(&pool, alice, day("2024-01-10"))
        .await
        .unwrap();
    let (other, inserted) = DiaryPageRepo::find_or_create(&pool, bob, day("2024-01-10"))
        .await
        .unwrap();
    assert!(inserted);
    assert_ne!(page.id, other.id);

    assert!(DiaryPageRepo::find_by_date(&pool, bob, day("2024-01-11"))
        .await
        .unwrap()
        .is_none());
    assert!(!DiaryPageRepo::delete(&pool, bob, page.id).await.unwrap());
    assert!(DiaryPageRepo::delete(&pool, alice, page.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_page_listing_aggregates_entries(pool: PgPool) {
    let user = new_user(&pool, "list@example.com").await;
    let (older, _) = DiaryPageRepo::find_or_create(&pool, user, day("2024-02-01"))
        .await
        .unwrap();
    let (newer, _) = DiaryPageRepo::find_or_create(&pool, user, day("2024-02-02"))
        .await
        .unwrap();

    DiaryEntryRepo::create(&pool, user, older.id, &new_entry("a", Some(2)))
        .await
        .unwrap();
    DiaryEntryRepo::create(&pool, user, older.id, &new_entry("b", Some(5)))
        .await
        .unwrap();
    DiaryEntryRepo::create(&pool, user, older.id, &new_entry("c", None))
        .await
        .unwrap();

    let pages = DiaryPageRepo::list_for_user(&pool, user, 10, 0).await.unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].id, newer.id);
    assert_eq!(pages[0].entry_count, 0);
    assert_eq!(pages[0].average_mood, None);
    assert_eq!(pages[1].entry_count, 3);
    assert_eq!(pages[1].average_mood, Some(3.5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_page_removes_entries(pool: PgPool) {
    let user = new_user(&pool, "cascade@example.com").await;
    let (page, _) = DiaryPageRepo::find_or_create(&pool, user, day("2024-03-01"))
        .await
        .unwrap();
    let entry = DiaryEntryRepo::create(&pool, user, page.id, &new_entry("gone", Some(3)))
        .await
        .unwrap();

    DiaryPageRepo::delete(&pool, user, page.id).await.unwrap();

    assert!(DiaryEntryRepo::find_by_id(&pool, user, entry.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(DiaryPageRepo::count_for_user(&pool, user).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entry_update_is_partial_and_scoped(pool: PgPool) {
    let owner = new_user(&pool, "owner@example.com").await;
    let stranger = new_user(&pool, "stranger@example.com").await;
    let (page, _) = DiaryPageRepo::find_or_create(&pool, owner, day("2024-04-01"))
        .await
        .unwrap();
    let entry = DiaryEntryRepo::create(&pool, owner, page.id, &new_entry("original", Some(2)))
        .await
        .unwrap();

    let patch = UpdateDiaryEntry {
        mood_score: Some(4),
        ..Default::default()
    };
    assert!(DiaryEntryRepo::update(&pool, stranger, entry.id, &patch)
        .await
        .unwrap()
        .is_none());

    let updated = DiaryEntryRepo::update(&pool, owner, entry.id, &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.mood_score, Some(4));
    assert_eq!(updated.content.as_deref(), Some("original"));
    assert!(updated.updated_at >= entry.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mood_score_check_constraint(pool: PgPool) {
    let user = new_user(&pool, "check@example.com").await;
    let (page, _) = DiaryPageRepo::find_or_create(&pool, user, day("2024-05-01"))
        .await
        .unwrap();

    let result = DiaryEntryRepo::create(&pool, user, page.id, &new_entry("x", Some(7))).await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mood_summary_skips_unscored_days(pool: PgPool) {
    let user = new_user(&pool, "summary@example.com").await;
    let other = new_user(&pool, "other@example.com").await;

    for (date, mood) in [
        ("2024-06-01", Some(1)),
        ("2024-06-01", Some(3)),
        ("2024-06-02", None),
        ("2024-06-05", Some(4)),
        ("2024-07-01", Some(5)),
    ] {
        let (page, _) = DiaryPageRepo::find_or_create(&pool, user, day(date))
            .await
            .unwrap();
        DiaryEntryRepo::create(&pool, user, page.id, &new_entry("m", mood))
            .await
            .unwrap();
    }
    let (page, _) = DiaryPageRepo::find_or_create(&pool, other, day("2024-06-01"))
        .await
        .unwrap();
    DiaryEntryRepo::create(&pool, other, page.id, &new_entry("not mine", Some(5)))
        .await
        .unwrap();

    let days = DiaryEntryRepo::mood_summary(&pool, user, day("2024-06-01"), day("2024-06-30"))
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].page_date, day("2024-06-01"));
    assert_eq!(days[0].average_mood, 2.0);
    assert_eq!(days[0].entry_count, 2);
    assert_eq!(days[1].page_date, day("2024-06-05"));
}
