//! Admin handlers for support groups and their participants.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serene_core::error::CoreError;
use serene_core::types::DbId;
use serene_db::models::group::{
    AddParticipant, CreateGroup, Group, GroupSummary, Participant, ParticipantInfo, UpdateGroup,
};
use serene_db::repositories::{GroupRepo, ParticipantRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum group name length (characters).
const MAX_GROUP_NAME_LENGTH: usize = 120;

/// A group with its members.
#[derive(Debug, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub participants: Vec<ParticipantInfo>,
}

/// GET /api/admin/groups
pub async fn list_groups(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<GroupSummary>>>> {
    let groups = GroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/admin/groups
pub async fn create_group(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateGroup>,
) -> AppResult<(StatusCode, Json<DataResponse<Group>>)> {
    validate_group_name(&input.name)?;
    let group = GroupRepo::create(&state.pool, &input, admin.user_id).await?;
    tracing::info!(group_id = group.id, admin_id = admin.user_id, "Group created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// GET /api/admin/groups/{id}
pub async fn get_group(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupDetail>>> {
    let group = find_group(&state, id).await?;
    let participants = ParticipantRepo::list_for_group(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: GroupDetail {
            group,
            participants,
        },
    }))
}

/// PUT /api/admin/groups/{id}
pub async fn update_group(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroup>,
) -> AppResult<Json<DataResponse<Group>>> {
    if let Some(name) = &input.name {
        validate_group_name(name)?;
    }
    let group = GroupRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Group", id }))?;
    Ok(Json(DataResponse { data: group }))
}

/// DELETE /api/admin/groups/{id}
///
/// Memberships are removed with the group.
pub async fn delete_group(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !GroupRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Group", id }));
    }
    tracing::info!(group_id = id, admin_id = admin.user_id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/groups/{id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ParticipantInfo>>>> {
    find_group(&state, id).await?;
    let participants = ParticipantRepo::list_for_group(&state.pool, id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// POST /api/admin/groups/{id}/participants
///
/// Adding an existing member is a 409.
pub async fn add_participant(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AddParticipant>,
) -> AppResult<(StatusCode, Json<DataResponse<Participant>>)> {
    find_group(&state, id).await?;
    if UserRepo::find_by_id(&state.pool, input.user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }));
    }

    let participant = ParticipantRepo::add(&state.pool, id, input.user_id).await?;
    tracing::info!(group_id = id, user_id = input.user_id, "Participant added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: participant })))
}

/// DELETE /api/admin/groups/{id}/participants/{user_id}
pub async fn remove_participant(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ParticipantRepo::remove(&state.pool, id, user_id).await? {
        return Err(AppError::NotFound(format!(
            "User {user_id} is not a member of group {id}"
        )));
    }
    tracing::info!(group_id = id, user_id, "Participant removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_group(state: &AppState, id: DbId) -> AppResult<Group> {
    GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Group", id }))
}

fn validate_group_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() || name.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Group name must be 1-{MAX_GROUP_NAME_LENGTH} characters"
        ))));
    }
    Ok(())
}
