//! Repository for the `save_offers` catalog table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::save_offer::{CreateSaveOffer, SaveOffer, UpdateSaveOffer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, title, description, active, created_at, updated_at";

/// Provides CRUD operations for a provider's save offer catalog.
pub struct SaveOfferRepo;

impl SaveOfferRepo {
    /// Insert a new catalog offer, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        input: &CreateSaveOffer,
    ) -> Result<SaveOffer, sqlx::Error> {
        let query = format!(
            "INSERT INTO save_offers (id, tenant_id, title, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SaveOffer>(&query)
            .bind(Uuid::new_v4())
            .bind(tenant_id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a catalog offer by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<SaveOffer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM save_offers WHERE id = $1");
        sqlx::query_as::<_, SaveOffer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a provider's catalog, newest first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<SaveOffer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM save_offers WHERE tenant_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SaveOffer>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Update a catalog offer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateSaveOffer,
    ) -> Result<Option<SaveOffer>, sqlx::Error> {
        let query = format!(
            "UPDATE save_offers SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                active = COALESCE($4, active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SaveOffer>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a catalog offer. Returns `true` if a row was removed. Attached
    /// copies on requests are value objects and survive catalog deletion.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM save_offers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
