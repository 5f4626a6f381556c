//! Save offer catalog entity model and DTOs.
//!
//! Catalog rows are the offers a provider's agents can attach to pending
//! cancellation requests. The attached copy on a request is a value object
//! (`proxylink_core::SaveOfferDetails`), not a foreign key; editing the
//! catalog never rewrites history.

use proxylink_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full save offer row from the `save_offers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOffer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new catalog offer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaveOffer {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// DTO for updating a catalog offer. All fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaveOffer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
