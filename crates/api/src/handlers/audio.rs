//! Handlers for browsing the audio library (`/audio`).
//!
//! Premium tracks are listed for everyone, flagged `locked` for callers
//! without premium access. Listings never expose storage keys; the stream
//! endpoint is the only way to a playable URL and it enforces the premium
//! check before signing one.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serene_core::error::CoreError;
use serene_core::media::PLAYBACK_URL_TTL_SECS;
use serene_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use serene_core::types::{DbId, Timestamp};
use serene_db::models::audio::{AudioCategory, AudioFile, AudioFilter, AudioMood};
use serene_db::repositories::{AudioCategoryRepo, AudioFileRepo, AudioMoodRepo};

use super::auth::load_user;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Library listing item. Carries no storage location.
#[derive(Debug, Serialize)]
pub struct AudioItem {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub duration_secs: Option<i32>,
    pub category_id: Option<DbId>,
    pub mood_id: Option<DbId>,
    pub is_premium: bool,
    /// Whether the caller needs premium to play this track.
    pub locked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AudioItem {
    fn new(file: AudioFile, can_play_premium: bool) -> Self {
        Self {
            locked: file.is_premium && !can_play_premium,
            id: file.id,
            title: file.title,
            description: file.description,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            duration_secs: file.duration_secs,
            category_id: file.category_id,
            mood_id: file.mood_id,
            is_premium: file.is_premium,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// Playback location for a track.
#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub id: DbId,
    /// Signed URL, valid for `expires_in_secs`.
    pub url: String,
    pub mime_type: String,
    pub expires_in_secs: i64,
}

/// GET /api/audio?category_id=&mood_id=&search=&limit=&offset=
pub async fn list_audio(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<AudioFilter>,
) -> AppResult<Json<ListResponse<AudioItem>>> {
    let can_play_premium = has_premium_access(&state, &auth).await?;
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let limit = clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(filter.offset);
    let files = AudioFileRepo::list(
        &state.pool,
        filter.category_id,
        filter.mood_id,
        search,
        limit,
        offset,
    )
    .await?;

    let items = files
        .into_iter()
        .map(|file| AudioItem::new(file, can_play_premium))
        .collect();

    Ok(Json(ListResponse::new(items, limit, offset)))
}

/// GET /api/audio/{id}
pub async fn get_audio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(audio_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AudioItem>>> {
    let file = find_audio(&state, audio_id).await?;
    let can_play_premium = has_premium_access(&state, &auth).await?;
    Ok(Json(DataResponse {
        data: AudioItem::new(file, can_play_premium),
    }))
}

/// GET /api/audio/{id}/stream
///
/// Returns a short-lived signed playback URL. Premium tracks require an
/// active premium plan (admins are always allowed).
pub async fn stream_audio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(audio_id): Path<DbId>,
) -> AppResult<Json<DataResponse<StreamResponse>>> {
    let file = find_audio(&state, audio_id).await?;

    if file.is_premium && !has_premium_access(&state, &auth).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "This track is available to premium members".into(),
        )));
    }

    let url = state
        .storage
        .playback_url(&file.storage_key, PLAYBACK_URL_TTL_SECS)
        .await?;

    Ok(Json(DataResponse {
        data: StreamResponse {
            id: file.id,
            url,
            mime_type: file.mime_type,
            expires_in_secs: PLAYBACK_URL_TTL_SECS,
        },
    }))
}

/// GET /api/audio/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AudioCategory>>>> {
    let categories = AudioCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/audio/moods
pub async fn list_moods(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AudioMood>>>> {
    let moods = AudioMoodRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: moods }))
}

async fn find_audio(state: &AppState, audio_id: DbId) -> AppResult<AudioFile> {
    AudioFileRepo::find_by_id(&state.pool, audio_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AudioFile",
            id: audio_id,
        }))
}

async fn has_premium_access(state: &AppState, auth: &AuthUser) -> AppResult<bool> {
    if auth.is_admin() {
        return Ok(true);
    }
    let user = load_user(state, auth.user_id).await?;
    Ok(user.is_premium(Utc::now()))
}
