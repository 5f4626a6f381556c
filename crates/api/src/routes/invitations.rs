//! Route definitions for user invitations.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::invitations;
use crate::state::AppState;

/// Invitation routes, nested under `/invitations`.
///
/// ```text
/// POST   /         create (any tenant member)
/// GET    /         list open (own tenant)
/// POST   /accept   accept (public; token is the credential)
/// DELETE /{id}     delete (own tenant)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invitations::list).post(invitations::create))
        .route("/accept", post(invitations::accept))
        .route("/{id}", delete(invitations::delete))
}
