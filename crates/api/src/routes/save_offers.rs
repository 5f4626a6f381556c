//! Route definitions for the provider save-offer catalog.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::save_offers;
use crate::state::AppState;

/// Save-offer routes, nested under `/save-offers`. All provider-only.
///
/// ```text
/// GET    /        list
/// POST   /        create
/// PATCH  /{id}    update
/// DELETE /{id}    delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(save_offers::list).post(save_offers::create))
        .route(
            "/{id}",
            patch(save_offers::update).delete(save_offers::delete),
        )
}
