//! ProxyLink API server library.
//!
//! Everything the binary entrypoint wires together lives here as public
//! modules, so integration tests can assemble the same router against a
//! test database.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
