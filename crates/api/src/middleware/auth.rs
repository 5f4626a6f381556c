//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use proxylink_core::{ChangeActor, CoreError, TenantType};
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated actor extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(actor: AuthActor) -> AppResult<Json<()>> {
///     tracing::info!(email = %actor.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthActor {
    /// The acting user's email (from `claims.sub`).
    pub email: String,
    /// The tenant the actor belongs to.
    pub tenant_id: Uuid,
    /// The tenant's side of the mediation.
    pub tenant_type: TenantType,
}

impl AuthActor {
    /// The change-attribution triple recorded in log entries.
    pub fn to_change_actor(&self) -> ChangeActor {
        ChangeActor {
            email: self.email.clone(),
            tenant_type: self.tenant_type,
            tenant_id: self.tenant_id,
        }
    }

    pub fn is_management(&self) -> bool {
        self.tenant_type == TenantType::Management
    }

    /// Guard: management tenants only.
    pub fn require_management(&self) -> AppResult<()> {
        if self.is_management() {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Management access required".into(),
            )))
        }
    }

    /// Guard: provider tenants only.
    pub fn require_provider(&self) -> AppResult<()> {
        if self.tenant_type == TenantType::Provider {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Provider access required".into(),
            )))
        }
    }

    /// Guard: proxy tenants only.
    pub fn require_proxy(&self) -> AppResult<()> {
        if self.tenant_type == TenantType::Proxy {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Proxy access required".into(),
            )))
        }
    }

    /// Guard: members of `tenant_id`, or management.
    pub fn require_tenant(&self, tenant_id: Uuid) -> AppResult<()> {
        if self.is_management() || self.tenant_id == tenant_id {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Not a member of this tenant".into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthActor {
            email: claims.sub,
            tenant_id: claims.tenant_id,
            tenant_type: claims.tenant_type,
        })
    }
}
