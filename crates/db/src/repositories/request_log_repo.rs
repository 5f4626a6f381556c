//! Repository for the `request_logs` table.
//!
//! Logs are append-only and 1:1 with requests. Writes happen only inside the
//! request pipelines' transactions: `initialize` during batch creation,
//! `append` during patch application. `append` takes the row lock, extends
//! the entry array, and recomputes the response-time summary from the full
//! resulting sequence, so concurrent updates serialize instead of losing
//! entries to read-modify-write races.

use proxylink_core::{average_response_time, ChangeActor, CoreError, RequestChange};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::request_log::RequestLog;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, request_id, changes, avg_response_time, created_at, updated_at";

/// Provides operations on request change logs.
pub struct RequestLogRepo;

impl RequestLogRepo {
    /// Insert the log row a request is born with: the seed entry recording
    /// `status: null -> Pending` and a zeroed summary. Runs on the creation
    /// transaction's connection.
    pub async fn initialize(
        conn: &mut PgConnection,
        id: Uuid,
        request_id: Uuid,
        seed: RequestChange,
    ) -> Result<RequestLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO request_logs (id, request_id, changes, avg_response_time)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RequestLog>(&query)
            .bind(id)
            .bind(request_id)
            .bind(Json(vec![seed]))
            .bind(Json(proxylink_core::ResponseTimeSummary::default()))
            .fetch_one(&mut *conn)
            .await
    }

    /// Append entries to a log under its row lock and store the recomputed
    /// summary. Stamps every entry with the deciding actor and the shared
    /// `now_ms` timestamp, overriding whatever the detector set.
    ///
    /// A missing log row is a data-integrity fault, not a 404: every request
    /// gets its log at birth, so absence here means the pairing was broken
    /// out-of-band.
    pub async fn append(
        conn: &mut PgConnection,
        log_id: Uuid,
        entries: &[RequestChange],
        actor: &ChangeActor,
        now_ms: i64,
    ) -> Result<RequestLog, StoreError> {
        if entries.is_empty() {
            return Err(CoreError::Validation(
                "Cannot append an empty change set to a request log".to_string(),
            )
            .into());
        }

        let existing = sqlx::query_scalar::<_, Json<Vec<RequestChange>>>(
            "SELECT changes FROM request_logs WHERE id = $1 FOR UPDATE",
        )
        .bind(log_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(Json(mut changes)) = existing else {
            tracing::error!(%log_id, "request log row missing during append");
            return Err(CoreError::Integrity(format!(
                "Request log {log_id} is missing; cannot append changes"
            ))
            .into());
        };

        changes.extend(entries.iter().cloned().map(|mut entry| {
            entry.changed_by = actor.clone();
            entry.updated_at = now_ms;
            entry
        }));
        let summary = average_response_time(&changes);

        let query = format!(
            "UPDATE request_logs
             SET changes = $2, avg_response_time = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let log = sqlx::query_as::<_, RequestLog>(&query)
            .bind(log_id)
            .bind(Json(changes))
            .bind(Json(summary))
            .fetch_one(&mut *conn)
            .await?;
        Ok(log)
    }

    /// Find the log belonging to a request.
    pub async fn find_by_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Option<RequestLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM request_logs WHERE request_id = $1");
        sqlx::query_as::<_, RequestLog>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }
}
