//! Handlers for the `/save-offers` resource.
//!
//! Save-offer templates are a provider-side catalog. Every route is
//! scoped to the caller's own tenant; another provider's offers are
//! indistinguishable from offers that do not exist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use proxylink_core::error::CoreError;
use proxylink_db::models::save_offer::{CreateSaveOffer, SaveOffer, UpdateSaveOffer};
use proxylink_db::repositories::SaveOfferRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/save-offers
///
/// List the provider's save-offer templates, newest first.
pub async fn list(auth: AuthActor, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    auth.require_provider()?;

    let offers = SaveOfferRepo::list_for_tenant(&state.pool, auth.tenant_id).await?;
    Ok(Json(DataResponse { data: offers }))
}

/// POST /api/v1/save-offers
///
/// Add a template to the provider's catalog.
pub async fn create(
    auth: AuthActor,
    State(state): State<AppState>,
    Json(input): Json<CreateSaveOffer>,
) -> AppResult<impl IntoResponse> {
    auth.require_provider()?;

    let offer = SaveOfferRepo::create(&state.pool, auth.tenant_id, &input).await?;

    tracing::info!(
        save_offer_id = %offer.id,
        tenant_id = %auth.tenant_id,
        "Save offer created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: offer })))
}

/// PATCH /api/v1/save-offers/{id}
///
/// Update a template in the provider's own catalog.
pub async fn update(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSaveOffer>,
) -> AppResult<impl IntoResponse> {
    auth.require_provider()?;
    ensure_owned(&state, &auth, id).await?;

    let offer = SaveOfferRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SaveOffer",
            id,
        }))?;

    tracing::info!(save_offer_id = %id, "Save offer updated");

    Ok(Json(DataResponse { data: offer }))
}

/// DELETE /api/v1/save-offers/{id}
///
/// Remove a template from the provider's own catalog. Requests that
/// already carry a copy of the offer keep it; the log is append-only.
pub async fn delete(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_provider()?;
    ensure_owned(&state, &auth, id).await?;

    let deleted = SaveOfferRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(save_offer_id = %id, "Save offer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "SaveOffer",
            id,
        }))
    }
}

/// Resolve the offer and check it belongs to the caller's tenant.
/// Foreign offers read as not found rather than forbidden.
async fn ensure_owned(state: &AppState, auth: &AuthActor, id: Uuid) -> AppResult<SaveOffer> {
    let offer = SaveOfferRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SaveOffer",
            id,
        }))?;
    if offer.tenant_id != auth.tenant_id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SaveOffer",
            id,
        }));
    }
    Ok(offer)
}
