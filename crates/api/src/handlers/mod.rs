//! Request handlers, grouped by resource.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers authenticate via [`crate::middleware::auth::AuthActor`],
//! delegate to the repositories in `proxylink_db`, and map errors via
//! [`crate::error::AppError`].

pub mod invitations;
pub mod requests;
pub mod save_offers;
pub mod tenants;
