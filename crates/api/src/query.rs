//! Query parameter types for API handlers.

use proxylink_core::{RequestStatus, RequestType};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for the request list endpoint
/// (`?status=&requestType=&tenantId=&limit=&offset=`).
///
/// `tenant_id` is honored only for management callers; everyone else is
/// scoped to their own tenant regardless of what they pass.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListParams {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub tenant_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
