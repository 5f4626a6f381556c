//! Repository for the `tenants` table.

use proxylink_core::customer_fields::DEFAULT_REQUIRED_FIELDS;
use proxylink_core::TenantType;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tenant::{CreateTenant, Tenant, UpdateTenant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, tenant_type, required_customer_fields, created_at, updated_at";

/// Provides CRUD operations for tenants.
pub struct TenantRepo;

impl TenantRepo {
    /// Insert a new tenant, returning the created row.
    ///
    /// Providers default to the built-in starter field set when the input
    /// names none; other tenant types always store an empty set.
    pub async fn create(pool: &PgPool, input: &CreateTenant) -> Result<Tenant, sqlx::Error> {
        let required_fields = match input.tenant_type {
            TenantType::Provider => input.required_customer_fields.clone().unwrap_or_else(|| {
                DEFAULT_REQUIRED_FIELDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            _ => Vec::new(),
        };

        let query = format!(
            "INSERT INTO tenants (id, name, tenant_type, required_customer_fields)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(input.tenant_type.as_str())
            .bind(Json(required_fields))
            .fetch_one(pool)
            .await
    }

    /// Find a tenant by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all tenants ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants ORDER BY created_at DESC");
        sqlx::query_as::<_, Tenant>(&query).fetch_all(pool).await
    }

    /// Update a tenant. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateTenant,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET
                name = COALESCE($2, name),
                required_customer_fields = COALESCE($3, required_customer_fields),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.required_customer_fields.clone().map(Json))
            .fetch_optional(pool)
            .await
    }
}
