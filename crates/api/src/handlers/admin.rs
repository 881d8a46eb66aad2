//! Handlers for the `/admin` console: dashboard counts and user management.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serene_core::error::CoreError;
use serene_core::plans::validate_plan;
use serene_core::roles::{validate_role, ROLE_ADMIN};
use serene_core::types::DbId;
use serene_db::models::dashboard::DashboardStats;
use serene_db::models::user::{UpdateUser, UserResponse};
use serene_db::repositories::{DashboardRepo, SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let stats = DashboardRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/admin/users
///
/// Newest accounts first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<UserResponse>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let now = Utc::now();
    let data = users
        .iter()
        .map(|u| UserResponse::from_user(u, now))
        .collect();
    Ok(Json(ListResponse::new(data, limit, offset)))
}

/// PUT /api/admin/users/{id}
///
/// Change a user's role, plan or active flag. Admins cannot demote or
/// deactivate themselves. Deactivation revokes the user's sessions.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(role) = &input.role {
        validate_role(role)?;
    }
    if let Some(plan) = &input.plan {
        validate_plan(plan)?;
    }
    if id == admin.user_id {
        let demoted = input.role.as_deref().is_some_and(|r| r != ROLE_ADMIN);
        let deactivated = input.is_active == Some(false);
        if demoted || deactivated {
            return Err(AppError::Core(CoreError::Validation(
                "Admins cannot demote or deactivate their own account".into(),
            )));
        }
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        role = ?input.role,
        plan = ?input.plan,
        is_active = ?input.is_active,
        "User updated by admin",
    );

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, Utc::now()),
    }))
}
