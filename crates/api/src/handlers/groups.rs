//! Handlers for the caller's support groups (`/groups`).

use axum::extract::State;
use axum::Json;
use serene_db::models::group::GroupSummary;
use serene_db::repositories::GroupRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/groups
///
/// Groups the caller participates in.
pub async fn my_groups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<GroupSummary>>>> {
    let groups = GroupRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: groups }))
}
