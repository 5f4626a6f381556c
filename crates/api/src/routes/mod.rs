pub mod health;
pub mod invitations;
pub mod requests;
pub mod save_offers;
pub mod tenants;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                      list, create_batch
/// /requests/{id}                 get, patch (change pipeline)
/// /requests/{id}/log             change log
///
/// /tenants                       list, create (management only)
/// /tenants/{id}                  get, patch (own tenant or management)
/// /tenants/{id}/requests         purge (DELETE, management only)
/// /tenants/{id}/users            user roster
///
/// /save-offers                   list, create (provider only)
/// /save-offers/{id}              patch, delete (provider only)
///
/// /invitations                   list open, create
/// /invitations/accept            redeem token (public)
/// /invitations/{id}              revoke (DELETE)
/// ```
///
/// `/health` lives at the root, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Support-request pipeline: batch intake, lifecycle, change log.
        .nest("/requests", requests::router())
        // Tenant administration and per-tenant purge.
        .nest("/tenants", tenants::router())
        // Provider-side save-offer catalog.
        .nest("/save-offers", save_offers::router())
        // User invitations, including the public accept endpoint.
        .nest("/invitations", invitations::router())
}
