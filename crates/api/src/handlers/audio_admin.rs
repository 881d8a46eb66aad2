//! Admin handlers for the audio library: uploads, metadata, categories, moods.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serene_core::audio::{storage_key, validate_upload};
use serene_core::diary::MAX_TITLE_LENGTH;
use serene_core::error::CoreError;
use serene_core::types::DbId;
use serene_db::models::audio::{
    AudioCategory, AudioFile, AudioMood, CreateAudioCategory, CreateAudioFile, CreateAudioMood,
    UpdateAudioCategory, UpdateAudioFile, UpdateAudioMood,
};
use serene_db::repositories::{AudioCategoryRepo, AudioFileRepo, AudioMoodRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fields collected from the upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    description: Option<String>,
    category_id: Option<DbId>,
    mood_id: Option<DbId>,
    is_premium: bool,
    duration_secs: Option<i32>,
}

#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Audio files
// ---------------------------------------------------------------------------

/// POST /api/admin/audio
///
/// Multipart form: `file` (required), `title` (required), `description`,
/// `category_id`, `mood_id`, `is_premium`, `duration_secs`. The object is
/// stored first; if the metadata insert then fails, the object is removed.
pub async fn upload_audio(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<AudioFile>>)> {
    let form = read_upload_form(multipart).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let title = form
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required 'title' field".into()))?;
    validate_title(&title)?;
    let mime_type = validate_upload(&file.content_type, file.data.len())?;
    if form.duration_secs.is_some_and(|d| d < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Duration must not be negative".into(),
        )));
    }

    let nonce = Uuid::new_v4().simple().to_string();
    let key = storage_key(Utc::now(), &nonce, &file.file_name);
    let size_bytes = file.data.len() as i64;
    state.storage.put(&key, file.data, &mime_type).await?;

    let input = CreateAudioFile {
        title,
        description: form.description,
        storage_key: key.clone(),
        mime_type,
        size_bytes,
        duration_secs: form.duration_secs,
        category_id: form.category_id,
        mood_id: form.mood_id,
        is_premium: form.is_premium,
        uploaded_by: Some(admin.user_id),
    };

    let audio = match AudioFileRepo::create(&state.pool, &input).await {
        Ok(audio) => audio,
        Err(err) => {
            if let Err(cleanup) = state.storage.delete(&key).await {
                tracing::error!(key = %key, error = %cleanup, "Failed to remove orphaned upload");
            } else {
                tracing::warn!(key = %key, "Removed upload after metadata insert failed");
            }
            return Err(err.into());
        }
    };

    tracing::info!(
        audio_id = audio.id,
        admin_id = admin.user_id,
        key = %audio.storage_key,
        size_bytes,
        "Audio uploaded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: audio })))
}

/// PUT /api/admin/audio/{id}
pub async fn update_audio(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAudioFile>,
) -> AppResult<Json<DataResponse<AudioFile>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let audio = AudioFileRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AudioFile",
            id,
        }))?;

    tracing::info!(audio_id = id, admin_id = admin.user_id, "Audio metadata updated");
    Ok(Json(DataResponse { data: audio }))
}

/// DELETE /api/admin/audio/{id}
///
/// Removes the row, then the stored object. A failed object removal is
/// logged; the track is already gone from the library.
pub async fn delete_audio(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let audio = AudioFileRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AudioFile",
            id,
        }))?;

    if let Err(e) = state.storage.delete(&audio.storage_key).await {
        tracing::error!(audio_id = id, key = %audio.storage_key, error = %e, "Failed to delete stored object");
    }

    tracing::info!(audio_id = id, admin_id = admin.user_id, "Audio deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// POST /api/admin/audio/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateAudioCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<AudioCategory>>)> {
    validate_name(&input.name)?;
    let category = AudioCategoryRepo::create(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, name = %category.name, "Audio category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/admin/audio/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAudioCategory>,
) -> AppResult<Json<DataResponse<AudioCategory>>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let category = AudioCategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AudioCategory",
            id,
        }))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/admin/audio/categories/{id}
///
/// Tracks in the category are kept, uncategorized.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AudioCategoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "AudioCategory",
            id,
        }));
    }
    tracing::info!(category_id = id, "Audio category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Moods
// ---------------------------------------------------------------------------

/// POST /api/admin/audio/moods
pub async fn create_mood(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateAudioMood>,
) -> AppResult<(StatusCode, Json<DataResponse<AudioMood>>)> {
    validate_name(&input.name)?;
    let mood = AudioMoodRepo::create(&state.pool, &input).await?;
    tracing::info!(mood_id = mood.id, name = %mood.name, "Audio mood created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: mood })))
}

/// PUT /api/admin/audio/moods/{id}
pub async fn update_mood(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAudioMood>,
) -> AppResult<Json<DataResponse<AudioMood>>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let mood = AudioMoodRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AudioMood",
            id,
        }))?;
    Ok(Json(DataResponse { data: mood }))
}

/// DELETE /api/admin/audio/moods/{id}
pub async fn delete_mood(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AudioMoodRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "AudioMood",
            id,
        }));
    }
    tracing::info!(mood_id = id, "Audio mood deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("audio").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let value = text.trim();
        match name.as_str() {
            "title" => form.title = Some(value.to_string()),
            "description" => form.description = non_empty(value),
            "category_id" => form.category_id = parse_optional(&name, value)?,
            "mood_id" => form.mood_id = parse_optional(&name, value)?,
            "duration_secs" => form.duration_secs = parse_optional(&name, value)?,
            "is_premium" => form.is_premium = matches!(value, "true" | "1" | "on"),
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_optional<T: std::str::FromStr>(field: &str, value: &str) -> AppResult<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Field '{field}' must be a number")))
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Title must be 1-{MAX_TITLE_LENGTH} characters"
        ))));
    }
    Ok(())
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() || name.chars().count() > 100 {
        return Err(AppError::Core(CoreError::Validation(
            "Name must be 1-100 characters".into(),
        )));
    }
    Ok(())
}
