use uuid::Uuid;

use crate::status::{RequestStatus, RequestType};
use crate::tenant::TenantType;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid status transition for {request_type} request: {from} -> {to} (actor is {role})")]
    InvalidTransition {
        request_type: RequestType,
        from: RequestStatus,
        to: RequestStatus,
        role: TenantType,
    },

    #[error("Data integrity fault: {0}")]
    Integrity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
