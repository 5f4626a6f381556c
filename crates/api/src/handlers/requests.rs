//! Handlers for the `/requests` resource.
//!
//! Covers batch submission, scoped listing, single lookup, the patch
//! pipeline, and the append-only change log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use proxylink_core::error::CoreError;
use proxylink_core::{RequestPatch, TenantType};
use proxylink_db::models::request::{CreateRequest, Request, RequestQuery};
use proxylink_db::repositories::{RequestLogRepo, RequestRepo};
use proxylink_events::{DomainEvent, REQUEST_CREATED, REQUEST_UPDATED};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthActor;
use crate::query::RequestListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests
///
/// Submit a batch of support requests. Proxy only; the batch is
/// all-or-nothing, so a single bad item rejects every item.
pub async fn create_batch(
    auth: AuthActor,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateRequest>>,
) -> AppResult<impl IntoResponse> {
    auth.require_proxy()?;

    let submitter = auth.to_change_actor();
    let requests = RequestRepo::create_batch(&state.pool, &submitter, &input).await?;

    tracing::info!(
        proxy_tenant_id = %auth.tenant_id,
        count = requests.len(),
        "Request batch created"
    );

    for request in &requests {
        let event = DomainEvent::new(REQUEST_CREATED)
            .with_source("request", request.id)
            .with_actor(&auth.email)
            .notify_tenant(request.provider_tenant_id)
            .with_payload(serde_json::json!({
                "requestType": request.request_type,
                "status": request.status,
            }));
        state.event_bus.publish(event);
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: requests })))
}

/// GET /api/v1/requests
///
/// List requests visible to the caller. Proxy and provider tenants only
/// ever see their own side; management sees everything and may narrow to
/// one tenant with `?tenantId=`.
pub async fn list(
    auth: AuthActor,
    State(state): State<AppState>,
    Query(params): Query<RequestListParams>,
) -> AppResult<impl IntoResponse> {
    let tenant_id = if auth.is_management() {
        params.tenant_id
    } else {
        Some(auth.tenant_id)
    };

    let query = RequestQuery {
        tenant_id,
        status: params.status,
        request_type: params.request_type,
        limit: params.limit,
        offset: params.offset,
    };
    let requests = RequestRepo::list(&state.pool, &query).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
///
/// Fetch a single request. Participants and management only.
pub async fn get_by_id(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let request = find_request(&state, id).await?;
    ensure_participant(&auth, &request)?;
    Ok(Json(DataResponse { data: request }))
}

/// PATCH /api/v1/requests/{id}
///
/// Apply a partial update through the change pipeline. The response
/// carries the updated request, the log entries this save appended, and
/// the provider's refreshed response-time averages.
pub async fn update(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RequestPatch>,
) -> AppResult<impl IntoResponse> {
    let request = find_request(&state, id).await?;
    ensure_participant(&auth, &request)?;

    let actor = auth.to_change_actor();
    let update = RequestRepo::apply_update(&state.pool, id, &actor, &patch).await?;

    if !update.appended.is_empty() {
        tracing::info!(
            request_id = %id,
            actor_tenant_id = %auth.tenant_id,
            changes = update.appended.len(),
            status = %update.request.status,
            "Request updated"
        );

        let mut event = DomainEvent::new(REQUEST_UPDATED)
            .with_source("request", id)
            .with_actor(&auth.email)
            .with_payload(serde_json::json!({
                "status": update.request.status,
                "changedFields": update.appended.len(),
            }));
        // Notify the side that did not make the change. Management edits
        // stay on the bus without a tenant recipient.
        if let Some(counterparty) = counterparty_tenant(&auth, &update.request) {
            event = event.notify_tenant(counterparty);
        }
        state.event_bus.publish(event);
    }

    Ok(Json(DataResponse { data: update }))
}

/// GET /api/v1/requests/{id}/log
///
/// Fetch the complete change log for a request. Participants and
/// management only.
pub async fn get_log(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let request = find_request(&state, id).await?;
    ensure_participant(&auth, &request)?;

    // Every request gets its log in the same transaction that creates it,
    // so a missing log is a broken store, not a 404.
    let log = RequestLogRepo::find_by_request(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Integrity(format!(
                "request {id} has no change log"
            )))
        })?;
    Ok(Json(DataResponse { data: log }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_request(state: &AppState, id: Uuid) -> AppResult<Request> {
    RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))
}

/// Participants (either side of the request) and management may act on a
/// request; everyone else is rejected.
fn ensure_participant(auth: &AuthActor, request: &Request) -> AppResult<()> {
    if auth.is_management()
        || auth.tenant_id == request.proxy_tenant_id
        || auth.tenant_id == request.provider_tenant_id
    {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "not a participant in this request".to_string(),
    )))
}

/// The tenant on the other side of the request from the actor, if the
/// actor is on one of the sides at all.
fn counterparty_tenant(auth: &AuthActor, request: &Request) -> Option<Uuid> {
    match auth.tenant_type {
        TenantType::Proxy => Some(request.provider_tenant_id),
        TenantType::Provider => Some(request.proxy_tenant_id),
        TenantType::Management => None,
    }
}
