//! PostgreSQL persistence for ProxyLink.
//!
//! Models mirror table rows; repositories are stateless structs with async
//! methods over a [`DbPool`]. The two request pipelines (batch creation and
//! patch application) run inside single transactions with row locks so a
//! request and its log can never drift apart.

pub mod error;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Default page size when a list query names none.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard ceiling on client-supplied page sizes.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by startup and the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations` at the workspace root.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Clamp a client-supplied limit into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a client-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
