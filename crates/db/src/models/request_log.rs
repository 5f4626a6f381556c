//! Request change log entity model.
//!
//! One row per request, holding the full ordered change history and the
//! response-time summary derived from it. Rows are append-only: entries are
//! pushed, never edited or removed.

use proxylink_core::types::Timestamp;
use proxylink_core::{RequestChange, ResponseTimeSummary};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Full log row from the `request_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    pub id: Uuid,
    pub request_id: Uuid,
    pub changes: Json<Vec<RequestChange>>,
    pub avg_response_time: Json<ResponseTimeSummary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
