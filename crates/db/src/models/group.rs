//! Support group and participant models.

use serde::{Deserialize, Serialize};
use serene_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Group listing row with its participant count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub participant_count: i64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A participant joined with the member's account and profile name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantInfo {
    pub id: DbId,
    pub group_id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub joined_at: Timestamp,
}

/// A row from the `participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: DbId,
    pub group_id: DbId,
    pub user_id: DbId,
    pub joined_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddParticipant {
    pub user_id: DbId,
}
