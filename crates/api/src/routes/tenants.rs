//! Route definitions for tenant administration.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::tenants;
use crate::state::AppState;

/// Tenant routes, nested under `/tenants`.
///
/// ```text
/// POST   /               create (management only)
/// GET    /               list (management only)
/// GET    /{id}           get_by_id (own tenant or management)
/// PATCH  /{id}           update (own tenant or management)
/// DELETE /{id}/requests  purge_requests (management only)
/// GET    /{id}/users     list_users (own tenant or management)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tenants::list).post(tenants::create))
        .route("/{id}", get(tenants::get_by_id).patch(tenants::update))
        .route("/{id}/requests", delete(tenants::purge_requests))
        .route("/{id}/users", get(tenants::list_users))
}
