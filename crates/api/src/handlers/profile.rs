//! Handlers for the caller's own profile (`/profile`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serene_core::error::CoreError;
use serene_core::profile::{validate_password, validate_profile};
use serene_db::models::cliente::{Cliente, UpdateCliente};
use serene_db::models::user::UserResponse;
use serene_db::repositories::{ClienteRepo, SessionRepo, UserRepo};

use super::auth::load_user;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Account plus customer profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    /// `None` for accounts created before profiles existed.
    pub profile: Option<Cliente>,
}

/// Request body for `PUT /profile/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let user = load_user(&state, auth.user_id).await?;
    let profile = ClienteRepo::find_by_user(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: ProfileResponse {
            user: UserResponse::from_user(&user, Utc::now()),
            profile,
        },
    }))
}

/// PUT /api/profile
///
/// Partial update; absent fields keep their value. Creates the profile row
/// if the account has none.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateCliente>,
) -> AppResult<Json<DataResponse<Cliente>>> {
    validate_profile(
        input.full_name.as_deref(),
        input.phone.as_deref(),
        input.bio.as_deref(),
    )?;
    if let Some(birth_date) = input.birth_date {
        if birth_date > Utc::now().date_naive() {
            return Err(AppError::Core(CoreError::Validation(
                "Birth date cannot be in the future".into(),
            )));
        }
    }

    let profile = ClienteRepo::upsert_for_user(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, "Profile updated");

    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/profile/password
///
/// Change the caller's password and revoke every refresh session, so other
/// devices must sign in again. Returns 204.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = load_user(&state, auth.user_id).await?;

    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }

    validate_password(&input.new_password)?;
    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, revoked, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}
