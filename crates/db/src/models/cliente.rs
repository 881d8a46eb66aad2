//! Customer profile (`clientes`) model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `clientes` table. One per user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cliente {
    pub id: DbId,
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Profile fields a user may change. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCliente {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}
