//! User entity model and DTOs.
//!
//! Users carry no credentials; authentication lives with the external
//! identity provider. A row here makes someone addressable for
//! notifications and ties them to a tenant.

use proxylink_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
