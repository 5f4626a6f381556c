//! Tenant entity model and DTOs.

use proxylink_core::types::Timestamp;
use proxylink_core::TenantType;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Full tenant row from the `tenants` table.
///
/// `tenant_type` holds the wire string (`proxy`, `provider`, `management`);
/// parse into [`TenantType`] where role logic needs it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub tenant_type: String,
    /// Customer authentication fields this provider requires with every
    /// request. Empty for proxy and management tenants.
    pub required_customer_fields: Json<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new tenant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenant {
    pub name: String,
    pub tenant_type: TenantType,
    /// Defaults to the built-in starter set for providers, empty otherwise.
    #[serde(default)]
    pub required_customer_fields: Option<Vec<String>>,
}

/// DTO for updating an existing tenant. All fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub required_customer_fields: Option<Vec<String>>,
}
