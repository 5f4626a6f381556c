//! Error type for the transactional request pipelines.
//!
//! Plain CRUD methods return `sqlx::Error` directly; only the pipelines that
//! mix domain validation with database work need the combined type.

use proxylink_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
