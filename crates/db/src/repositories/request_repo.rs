//! Repository for the `requests` table and the two request pipelines.
//!
//! Batch creation and patch application both run as single transactions.
//! Creation is all-or-nothing across the batch; application locks the
//! request row first and the log row second, validates the status
//! transition before touching anything, and commits snapshot and log
//! together so neither can land without the other.

use chrono::Utc;
use proxylink_core::customer_fields::validate_customer_info;
use proxylink_core::status::validate_transition;
use proxylink_core::{
    changes, detect_changes, ChangeActor, CoreError, Participants, RequestChange, RequestStatus,
    RequestType, ResponseTimeSummary, TenantType,
};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::request::{CreateRequest, Request, RequestQuery};
use crate::repositories::request_log_repo::RequestLogRepo;
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, version, status, request_type, date_submitted, date_responded, \
    proxy_tenant_id, provider_tenant_id, participants, customer_info, \
    save_offer, decline_reason, resolved, notes, log_id, created_at, updated_at";

/// Everything a successful patch application produced.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdate {
    pub request: Request,
    /// The entries this save appended, already actor- and timestamp-stamped.
    /// Empty for a no-op patch, which writes nothing.
    pub appended: Vec<RequestChange>,
    pub avg_response_time: ResponseTimeSummary,
}

/// Minimal provider row consulted during creation.
#[derive(sqlx::FromRow)]
struct ProviderConfig {
    tenant_type: String,
    required_customer_fields: Json<Vec<String>>,
}

/// Provides creation, lookup, and the update pipeline for requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Create a batch of requests in one transaction, all-or-nothing.
    ///
    /// `submitter` is the proxy user uploading the batch; their tenant
    /// becomes the proxy side of every item. Each item checks that the
    /// provider exists, is a provider, and requires every submitted
    /// customer-info key; each inserted request gets its log row with the
    /// `status: null -> Pending` seed entry in the same transaction.
    pub async fn create_batch(
        pool: &PgPool,
        submitter: &ChangeActor,
        items: &[CreateRequest],
    ) -> Result<Vec<Request>, StoreError> {
        if items.is_empty() {
            return Err(
                CoreError::Validation("A request batch must contain at least one item".to_string())
                    .into(),
            );
        }

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());

        for item in items {
            let provider = sqlx::query_as::<_, ProviderConfig>(
                "SELECT tenant_type, required_customer_fields FROM tenants WHERE id = $1",
            )
            .bind(item.provider_tenant_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Tenant",
                id: item.provider_tenant_id,
            })?;

            if provider.tenant_type != TenantType::Provider.as_str() {
                return Err(CoreError::Validation(format!(
                    "Tenant {} is not a provider",
                    item.provider_tenant_id
                ))
                .into());
            }
            validate_customer_info(item.customer_info.keys(), &provider.required_customer_fields)?;

            let now = Utc::now();
            let request_id = Uuid::new_v4();
            let log_id = Uuid::new_v4();

            let query = format!(
                "INSERT INTO requests
                    (id, version, status, request_type, date_submitted,
                     proxy_tenant_id, provider_tenant_id, participants,
                     customer_info, notes, log_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 RETURNING {COLUMNS}"
            );
            let request = sqlx::query_as::<_, Request>(&query)
                .bind(request_id)
                .bind(proxylink_core::types::SCHEMA_VERSION)
                .bind(RequestStatus::Pending.as_str())
                .bind(item.request_type.as_str())
                .bind(now)
                .bind(submitter.tenant_id)
                .bind(item.provider_tenant_id)
                .bind(Json(Participants::submitter(&submitter.email)))
                .bind(Json(item.customer_info.clone()))
                .bind(&item.notes)
                .bind(log_id)
                .fetch_one(&mut *tx)
                .await?;

            let seed = changes::creation_change(submitter, now.timestamp_millis());
            RequestLogRepo::initialize(&mut tx, log_id, request_id, seed).await?;
            created.push(request);
        }

        tx.commit().await?;
        tracing::info!(
            count = created.len(),
            proxy_tenant = %submitter.tenant_id,
            "created request batch"
        );
        Ok(created)
    }

    /// Find a request by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Query requests with filtering and pagination, newest first.
    pub async fn list(pool: &PgPool, params: &RequestQuery) -> Result<Vec<Request>, sqlx::Error> {
        let limit = clamp_limit(params.limit);
        let offset = clamp_offset(params.offset);

        let (where_clause, bind_values, bind_idx) = build_request_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM requests {where_clause} \
             ORDER BY date_submitted DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Request>(&query);
        for value in &bind_values {
            q = match value {
                BindValue::Uuid(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.clone()),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Apply a partial update through the full pipeline: lock, authorize,
    /// validate the transition, detect changes, persist snapshot and log
    /// together.
    ///
    /// A patch that produces no changes returns with `appended` empty and
    /// nothing written. Validation and transition failures surface before
    /// any write occurs.
    pub async fn apply_update(
        pool: &PgPool,
        id: Uuid,
        actor: &ChangeActor,
        patch: &proxylink_core::RequestPatch,
    ) -> Result<RequestUpdate, StoreError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1 FOR UPDATE");
        let request = sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Request",
                id,
            })?;

        match actor.tenant_type {
            TenantType::Proxy if actor.tenant_id == request.proxy_tenant_id => {}
            TenantType::Provider if actor.tenant_id == request.provider_tenant_id => {}
            TenantType::Management => {}
            _ => {
                return Err(CoreError::Forbidden(
                    "Actor's tenant is not a party to this request".to_string(),
                )
                .into())
            }
        }

        let request_type: RequestType = request.request_type.parse()?;
        let snapshot = request.snapshot()?;

        if let Some(target) = patch.status {
            if target != snapshot.status {
                validate_transition(request_type, snapshot.status, target, actor.tenant_type)?;
            }
        }

        if let Some(offer_patch) = &patch.save_offer {
            if snapshot.save_offer.is_none() && !offer_patch.establishes_offer() {
                return Err(CoreError::Validation(
                    "saveOffer patch modifies an offer that does not exist".to_string(),
                )
                .into());
            }
        }

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let appended = detect_changes(&snapshot, patch, actor, now_ms);

        if appended.is_empty() {
            let summary = sqlx::query_scalar::<_, Json<ResponseTimeSummary>>(
                "SELECT avg_response_time FROM request_logs WHERE id = $1",
            )
            .bind(request.log_id)
            .fetch_optional(&mut *tx)
            .await?
            .map(|j| j.0)
            .unwrap_or_default();
            tx.commit().await?;
            return Ok(RequestUpdate {
                request,
                appended,
                avg_response_time: summary,
            });
        }

        let next = snapshot.apply(patch);

        // Resolution flag: a decline citing fields opens an issue; the
        // recovery resubmit closes it.
        let mut resolved = request.resolved;
        if patch.status == Some(RequestStatus::Declined) && next.decline_reason.is_some() {
            resolved = Some(false);
        }
        if patch.status == Some(RequestStatus::Pending) && snapshot.status == RequestStatus::Declined
        {
            resolved = None;
        }

        let mut participants = request.participants.0.clone();
        participants.record(actor.tenant_type, &actor.email);

        let query = format!(
            "UPDATE requests SET
                status = $2,
                date_responded = $3,
                customer_info = $4,
                save_offer = $5,
                decline_reason = $6,
                resolved = $7,
                notes = $8,
                participants = $9,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(next.status.as_str())
            .bind(next.date_responded.map(proxylink_core::types::from_ms))
            .bind(Json(next.customer_info))
            .bind(next.save_offer.map(Json))
            .bind(next.decline_reason.map(Json))
            .bind(resolved)
            .bind(&next.notes)
            .bind(Json(participants))
            .fetch_one(&mut *tx)
            .await?;

        let log = RequestLogRepo::append(&mut tx, request.log_id, &appended, actor, now_ms).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %id,
            appended = appended.len(),
            status = %updated.status,
            actor = %actor.email,
            "applied request update"
        );
        Ok(RequestUpdate {
            request: updated,
            appended,
            avg_response_time: log.avg_response_time.0,
        })
    }

    /// Delete every request a tenant participates in, on either side. Log
    /// rows go with them via the cascade. Returns the number of requests
    /// removed.
    pub async fn purge_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM requests WHERE proxy_tenant_id = $1 OR provider_tenant_id = $1")
                .bind(tenant_id)
                .execute(pool)
                .await?;
        tracing::info!(%tenant_id, purged = result.rows_affected(), "purged tenant requests");
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built request queries.
enum BindValue {
    Uuid(Uuid),
    Text(String),
}

/// Build a WHERE clause and bind values from `RequestQuery` filters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The clause is
/// empty when no filters are active, otherwise starts with `WHERE `.
fn build_request_filter(params: &RequestQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(tenant_id) = params.tenant_id {
        conditions.push(format!(
            "(proxy_tenant_id = ${bind_idx} OR provider_tenant_id = ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Uuid(tenant_id));
    }

    if let Some(status) = params.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.as_str().to_string()));
    }

    if let Some(request_type) = params.request_type {
        conditions.push(format!("request_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(request_type.as_str().to_string()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
