//! Route definitions for the support-request pipeline.

use axum::routing::get;
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Request routes, nested under `/requests`.
///
/// ```text
/// POST   /              create_batch (proxy only)
/// GET    /              list (own side; management sees all)
/// GET    /{id}          get_by_id
/// PATCH  /{id}          update (change pipeline)
/// GET    /{id}/log      get_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(requests::list).post(requests::create_batch))
        .route("/{id}", get(requests::get_by_id).patch(requests::update))
        .route("/{id}/log", get(requests::get_log))
}
