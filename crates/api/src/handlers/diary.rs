//! Handlers for the personal diary (`/diary`).
//!
//! Every query is scoped to the caller's user id; another user's page or
//! entry id is indistinguishable from a missing one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serene_core::diary::{validate_entry, validate_mood_range, validate_page_date};
use serene_core::error::CoreError;
use serene_core::plans::{check_page_quota, effective_plan, page_limit};
use serene_core::types::DbId;
use serene_db::models::diary::{
    CreateDiaryEntry, DiaryEntry, DiaryPage, DiaryPageSummary, MoodDay, UpdateDiaryEntry,
};
use serene_db::models::user::User;
use serene_db::repositories::{DiaryEntryRepo, DiaryPageRepo, PricingPlanRepo};

use super::auth::load_user;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Days covered by the mood summary when no range is given.
const DEFAULT_MOOD_WINDOW_DAYS: u64 = 30;

/// A page together with its entries.
#[derive(Debug, Serialize)]
pub struct PageWithEntries {
    #[serde(flatten)]
    pub page: DiaryPage,
    pub entries: Vec<DiaryEntry>,
}

/// Query parameters for `GET /diary/moods`.
#[derive(Debug, Deserialize)]
pub struct MoodRangeParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// GET /api/diary/pages
///
/// The caller's pages, newest first, with entry counts and average mood.
pub async fn list_pages(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<DiaryPageSummary>>> {
    let (limit, offset) = params.resolve();
    let pages = DiaryPageRepo::list_for_user(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(ListResponse::new(pages, limit, offset)))
}

/// GET /api/diary/pages/{date}
pub async fn get_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(page_date): Path<NaiveDate>,
) -> AppResult<Json<DataResponse<PageWithEntries>>> {
    let page = DiaryPageRepo::find_by_date(&state.pool, auth.user_id, page_date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No diary page for {page_date}")))?;
    let entries = DiaryEntryRepo::list_for_page(&state.pool, auth.user_id, page.id).await?;

    Ok(Json(DataResponse {
        data: PageWithEntries { page, entries },
    }))
}

/// DELETE /api/diary/pages/{id}
///
/// Deletes the page and, by cascade, its entries. Frees one unit of quota.
pub async fn delete_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(page_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DiaryPageRepo::delete(&state.pool, auth.user_id, page_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "DiaryPage",
            id: page_id,
        }));
    }
    tracing::info!(user_id = auth.user_id, page_id, "Diary page deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// POST /api/diary/entries
///
/// Write an entry on the page for `page_date` (default: today, UTC). When
/// that page does not exist yet, the caller's plan quota is checked before
/// it is created.
pub async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateDiaryEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<DiaryEntry>>)> {
    validate_entry(
        input.title.as_deref(),
        input.content.as_deref(),
        input.mood_score,
        input.mood_label.as_deref(),
        true,
    )?;

    let today = Utc::now().date_naive();
    let page_date = input.page_date.unwrap_or(today);
    validate_page_date(page_date, today)?;

    let page = match DiaryPageRepo::find_by_date(&state.pool, auth.user_id, page_date).await? {
        Some(page) => page,
        None => {
            let user = load_user(&state, auth.user_id).await?;
            enforce_page_quota(&state, &user).await?;
            let (page, inserted) =
                DiaryPageRepo::find_or_create(&state.pool, auth.user_id, page_date).await?;
            if inserted {
                tracing::debug!(user_id = auth.user_id, %page_date, page_id = page.id, "Diary page created");
            }
            page
        }
    };

    let entry = DiaryEntryRepo::create(&state.pool, auth.user_id, page.id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        page_id = page.id,
        entry_id = entry.id,
        "Diary entry created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/diary/entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<DbId>,
) -> AppResult<Json<DataResponse<DiaryEntry>>> {
    let entry = DiaryEntryRepo::find_by_id(&state.pool, auth.user_id, entry_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DiaryEntry",
            id: entry_id,
        }))?;
    Ok(Json(DataResponse { data: entry }))
}

/// PUT /api/diary/entries/{id}
pub async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<DbId>,
    Json(input): Json<UpdateDiaryEntry>,
) -> AppResult<Json<DataResponse<DiaryEntry>>> {
    validate_entry(
        input.title.as_deref(),
        input.content.as_deref(),
        input.mood_score,
        input.mood_label.as_deref(),
        false,
    )?;

    let entry = DiaryEntryRepo::update(&state.pool, auth.user_id, entry_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DiaryEntry",
            id: entry_id,
        }))?;

    tracing::info!(user_id = auth.user_id, entry_id, "Diary entry updated");

    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/diary/entries/{id}
///
/// The page stays even when its last entry goes.
pub async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DiaryEntryRepo::delete(&state.pool, auth.user_id, entry_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "DiaryEntry",
            id: entry_id,
        }));
    }
    tracing::info!(user_id = auth.user_id, entry_id, "Diary entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Mood tracking
// ---------------------------------------------------------------------------

/// GET /api/diary/moods?from=&to=
///
/// Average mood per day over an inclusive range. Defaults to the last 30 days.
/// Days without scored entries are omitted.
pub async fn mood_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MoodRangeParams>,
) -> AppResult<Json<DataResponse<Vec<MoodDay>>>> {
    let to = params.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = match params.from {
        Some(from) => from,
        None => to
            .checked_sub_days(Days::new(DEFAULT_MOOD_WINDOW_DAYS))
            .unwrap_or(to),
    };
    validate_mood_range(from, to)?;

    let days = DiaryEntryRepo::mood_summary(&state.pool, auth.user_id, from, to).await?;
    Ok(Json(DataResponse { data: days }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject creating one more page when the user's plan quota is used up.
async fn enforce_page_quota(state: &AppState, user: &User) -> AppResult<()> {
    let tier = effective_plan(&user.plan, user.subscription_expires_at, Utc::now());
    let catalogue = PricingPlanRepo::page_limit_for_tier(&state.pool, tier).await?;
    let limit = page_limit(tier, catalogue);
    if limit.is_none() {
        return Ok(());
    }

    let used = DiaryPageRepo::count_for_user(&state.pool, user.id).await?;
    check_page_quota(used, limit).inspect_err(|_| {
        tracing::info!(user_id = user.id, tier, used, "Diary page quota reached");
    })?;
    Ok(())
}
