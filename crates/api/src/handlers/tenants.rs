//! Handlers for the `/tenants` resource.
//!
//! Tenant administration is a management concern; individual tenants can
//! read and update only their own record.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use proxylink_core::customer_fields::validate_required_fields;
use proxylink_core::error::CoreError;
use proxylink_db::models::tenant::{CreateTenant, UpdateTenant};
use proxylink_db::repositories::{RequestRepo, TenantRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tenants
///
/// Register a new tenant. Management only.
pub async fn create(
    auth: AuthActor,
    State(state): State<AppState>,
    Json(input): Json<CreateTenant>,
) -> AppResult<impl IntoResponse> {
    auth.require_management()?;

    if let Some(fields) = &input.required_customer_fields {
        validate_required_fields(fields)?;
    }

    let tenant = TenantRepo::create(&state.pool, &input).await?;

    tracing::info!(
        tenant_id = %tenant.id,
        tenant_type = %tenant.tenant_type,
        "Tenant created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: tenant })))
}

/// GET /api/v1/tenants
///
/// List all tenants. Management only.
pub async fn list(auth: AuthActor, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    auth.require_management()?;

    let tenants = TenantRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: tenants }))
}

/// GET /api/v1/tenants/{id}
///
/// Fetch a tenant record. Own tenant or management.
pub async fn get_by_id(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    auth.require_tenant(id)?;

    let tenant = TenantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tenant",
            id,
        }))?;
    Ok(Json(DataResponse { data: tenant }))
}

/// PATCH /api/v1/tenants/{id}
///
/// Update a tenant's name or required customer fields. Own tenant or
/// management.
pub async fn update(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTenant>,
) -> AppResult<impl IntoResponse> {
    auth.require_tenant(id)?;

    if let Some(fields) = &input.required_customer_fields {
        validate_required_fields(fields)?;
    }

    let tenant = TenantRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tenant",
            id,
        }))?;

    tracing::info!(tenant_id = %id, "Tenant updated");

    Ok(Json(DataResponse { data: tenant }))
}

/// DELETE /api/v1/tenants/{id}/requests
///
/// Purge every request the tenant participates in, on either side.
/// Management only; logs cascade with the requests.
pub async fn purge_requests(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    auth.require_management()?;

    let purged = RequestRepo::purge_tenant(&state.pool, id).await?;

    tracing::info!(tenant_id = %id, purged, "Tenant requests purged");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "purged": purged }),
    }))
}

/// GET /api/v1/tenants/{id}/users
///
/// List the tenant's user roster. Own tenant or management.
pub async fn list_users(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    auth.require_tenant(id)?;

    let users = UserRepo::list_for_tenant(&state.pool, id).await?;
    Ok(Json(DataResponse { data: users }))
}
