//! Repository for the `users` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, email, display_name, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Fails with a unique violation on `uq_users_email` when the email is
    /// already registered.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, tenant_id, email, display_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(input.tenant_id)
            .bind(&input.email)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's users ordered by most recently created first.
    pub async fn list_for_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }
}
