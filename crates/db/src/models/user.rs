//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use serene_core::plans;
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub plan: String,
    pub stripe_customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub subscription_expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether the user has premium access at `now`.
    pub fn is_premium(&self, now: Timestamp) -> bool {
        plans::is_premium_active(&self.plan, self.subscription_expires_at, now)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub plan: String,
    /// `plan` after applying the expiry date.
    pub effective_plan: &'static str,
    pub subscription_status: Option<String>,
    pub subscription_expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: &User, now: Timestamp) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            plan: user.plan.clone(),
            effective_plan: plans::effective_plan(&user.plan, user.subscription_expires_at, now),
            subscription_status: user.subscription_status.clone(),
            subscription_expires_at: user.subscription_expires_at,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Admin DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub role: Option<String>,
    pub plan: Option<String>,
    pub is_active: Option<bool>,
}
