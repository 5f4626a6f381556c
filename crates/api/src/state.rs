use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared state handed to every handler through `State<AppState>`.
///
/// Cloning is cheap: the pool is internally reference-counted and the rest
/// sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: proxylink_db::DbPool,
    /// Server configuration (JWT secret, CORS, timeouts).
    pub config: Arc<ServerConfig>,
    /// Bus on which handlers publish domain events.
    pub event_bus: Arc<proxylink_events::EventBus>,
}
