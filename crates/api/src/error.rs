use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use proxylink_core::CoreError;
use proxylink_db::StoreError;
use serde_json::json;

/// Handler-level error type.
///
/// Everything a handler can fail with funnels into this enum, and
/// [`IntoResponse`] turns it into the `{ "error": ..., "code": ... }`
/// JSON body with the matching HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `proxylink_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            StoreError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => core_response(core),
            AppError::Database(err) => sqlx_response(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto status, code, and client-visible message.
///
/// Integrity and internal faults are logged here and reach the client
/// only as sanitized 500s; every other variant carries its own message.
fn core_response(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", core.to_string())
        }
        CoreError::Integrity(msg) => {
            tracing::error!(error = %msg, "Data integrity fault");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATA_INTEGRITY",
                "A data integrity fault occurred".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal_error()
        }
    }
}

/// Map a sqlx error onto status, code, and client-visible message.
///
/// `RowNotFound` reads as 404. A `23505` unique violation on one of the
/// schema's `uq_*` constraints reads as 409. Anything else is logged and
/// sanitized to a plain 500.
fn sqlx_response(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    internal_error()
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
