//! Request entity model and DTOs.

use proxylink_core::types::{to_ms, Timestamp};
use proxylink_core::{
    CoreError, CustomerInfo, FlaggedField, Participants, RequestSnapshot, RequestType,
    SaveOfferDetails,
};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Full request row from the `requests` table.
///
/// `status` and `request_type` hold the wire strings; parse them into the
/// typed enums where lifecycle logic needs them. The `log_id` pairing is
/// fixed at creation and never changes.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub version: i32,
    pub status: String,
    pub request_type: String,
    pub date_submitted: Timestamp,
    pub date_responded: Option<Timestamp>,
    pub proxy_tenant_id: Uuid,
    pub provider_tenant_id: Uuid,
    pub participants: Json<Participants>,
    pub customer_info: Json<CustomerInfo>,
    pub save_offer: Option<Json<SaveOfferDetails>>,
    pub decline_reason: Option<Json<Vec<FlaggedField>>>,
    /// Pipeline-managed resolution flag: `false` while a decline with cited
    /// fields awaits correction, cleared on recovery, never diffed.
    pub resolved: Option<bool>,
    pub notes: Option<String>,
    pub log_id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Request {
    /// The tracked fields in the units change detection compares
    /// (status enum, epoch-ms dates, plain maps).
    pub fn snapshot(&self) -> Result<RequestSnapshot, CoreError> {
        Ok(RequestSnapshot {
            status: self.status.parse()?,
            date_responded: self.date_responded.map(to_ms),
            customer_info: self.customer_info.0.clone(),
            save_offer: self.save_offer.as_ref().map(|j| j.0.clone()),
            decline_reason: self.decline_reason.as_ref().map(|j| j.0.clone()),
            notes: self.notes.clone(),
        })
    }
}

/// DTO for one item of a creation batch. The proxy tenant and submitter come
/// from the authenticated actor, never the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub request_type: RequestType,
    pub provider_tenant_id: Uuid,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Filter parameters for request list queries.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    /// Restrict to requests where this tenant is on either side. Handlers
    /// force this to the caller's tenant unless the caller is management.
    pub tenant_id: Option<Uuid>,
    pub status: Option<proxylink_core::RequestStatus>,
    pub request_type: Option<RequestType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
