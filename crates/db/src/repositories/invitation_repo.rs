//! Repository for the `invitations` table.

use proxylink_core::types::Timestamp;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::invitation::Invitation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, tenant_id, email, invited_by, token_hash, expires_at, accepted_at, created_at";

/// Provides CRUD operations for invitations.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new invitation, returning the created row. The token hash is
    /// computed by the caller; the plaintext never reaches this layer.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        email: &str,
        invited_by: &str,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitations (id, tenant_id, email, invited_by, token_hash, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(Uuid::new_v4())
            .bind(tenant_id)
            .bind(email)
            .bind(invited_by)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an invitation by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an invitation by its token hash.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE token_hash = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's open (unredeemed, unexpired) invitations.
    pub async fn list_open_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations
             WHERE tenant_id = $1 AND accepted_at IS NULL AND expires_at > NOW()
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Mark an invitation redeemed. Returns `false` if it was already
    /// redeemed (or the row is gone), making redemption race-safe.
    pub async fn mark_accepted(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET accepted_at = NOW() WHERE id = $1 AND accepted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete (revoke) an invitation. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
