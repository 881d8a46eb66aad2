//! Repository for the `clientes` table.

use serene_core::types::DbId;
use sqlx::PgPool;

use crate::models::cliente::{Cliente, UpdateCliente};

const COLUMNS: &str = "id, user_id, full_name, phone, birth_date, avatar_url, bio, \
                        created_at, updated_at";

/// Provides profile operations for customers.
pub struct ClienteRepo;

impl ClienteRepo {
    /// Create the profile row for a user. A second call is a no-op that
    /// returns the existing row.
    pub async fn create_for_user(
        pool: &PgPool,
        user_id: DbId,
        full_name: Option<&str>,
    ) -> Result<Cliente, sqlx::Error> {
        let query = format!(
            "WITH inserted AS (
                INSERT INTO clientes (user_id, full_name) VALUES ($1, $2)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING {COLUMNS}
             )
             SELECT {COLUMNS} FROM inserted
             UNION ALL
             SELECT {COLUMNS} FROM clientes WHERE user_id = $1
             LIMIT 1"
        );
        sqlx::query_as::<_, Cliente>(&query)
            .bind(user_id)
            .bind(full_name)
            .fetch_one(pool)
            .await
    }

    /// Find the profile for a user.
    pub async fn find_by_user(pool: &PgPool, user_id: DbId) -> Result<Option<Cliente>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clientes WHERE user_id = $1");
        sqlx::query_as::<_, Cliente>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Partially update a user's profile, creating it first if missing.
    pub async fn upsert_for_user(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateCliente,
    ) -> Result<Cliente, sqlx::Error> {
        let query = format!(
            "INSERT INTO clientes (user_id, full_name, phone, birth_date, avatar_url, bio)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE SET
                full_name = COALESCE(EXCLUDED.full_name, clientes.full_name),
                phone = COALESCE(EXCLUDED.phone, clientes.phone),
                birth_date = COALESCE(EXCLUDED.birth_date, clientes.birth_date),
                avatar_url = COALESCE(EXCLUDED.avatar_url, clientes.avatar_url),
                bio = COALESCE(EXCLUDED.bio, clientes.bio)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cliente>(&query)
            .bind(user_id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.birth_date)
            .bind(&input.avatar_url)
            .bind(&input.bio)
            .fetch_one(pool)
            .await
    }
}
