//! Handlers for the `/invitations` resource.
//!
//! Any tenant member can invite a colleague into their own tenant. The
//! plaintext token is returned **only** on creation and travels to the
//! invitee out of band; redemption is a public endpoint where the token
//! itself is the credential.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use proxylink_core::error::CoreError;
use proxylink_core::invite::{default_expiry, generate_invite_token, hash_invite_token};
use proxylink_db::models::invitation::{
    AcceptInvitation, CreateInvitation, InvitationCreatedResponse, InvitationResponse,
};
use proxylink_db::models::user::CreateUser;
use proxylink_db::repositories::{InvitationRepo, UserRepo};
use proxylink_events::{DomainEvent, INVITATION_CREATED};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/invitations
///
/// Invite a new user into the caller's tenant. The plaintext token is
/// returned exactly once.
pub async fn create(
    auth: AuthActor,
    State(state): State<AppState>,
    Json(input): Json<CreateInvitation>,
) -> AppResult<impl IntoResponse> {
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "invitation email must be a valid address".to_string(),
        )));
    }

    let token = generate_invite_token();
    let expires_at = default_expiry(Utc::now());
    let invitation = InvitationRepo::create(
        &state.pool,
        auth.tenant_id,
        email,
        &auth.email,
        &token.hash,
        expires_at,
    )
    .await?;

    tracing::info!(
        invitation_id = %invitation.id,
        tenant_id = %auth.tenant_id,
        "Invitation created"
    );

    // The mailer picks the recipient out of the payload; the tenant roster
    // is not notified about its own invitation.
    let event = DomainEvent::new(INVITATION_CREATED)
        .with_source("invitation", invitation.id)
        .with_actor(&auth.email)
        .with_payload(serde_json::json!({
            "email": invitation.email,
            "token": token.plaintext,
            "expiresAt": invitation.expires_at,
        }));
    state.event_bus.publish(event);

    let response = InvitationCreatedResponse {
        id: invitation.id,
        tenant_id: invitation.tenant_id,
        email: invitation.email,
        invited_by: invitation.invited_by,
        token: token.plaintext,
        expires_at: invitation.expires_at,
        created_at: invitation.created_at,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/invitations
///
/// List the caller tenant's open (unredeemed, unexpired) invitations.
pub async fn list(auth: AuthActor, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let invitations = InvitationRepo::list_open_for_tenant(&state.pool, auth.tenant_id).await?;
    let data: Vec<InvitationResponse> = invitations.into_iter().map(Into::into).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/invitations/accept
///
/// Redeem an invitation token and create the invited user. Public: the
/// token is the credential.
pub async fn accept(
    State(state): State<AppState>,
    Json(input): Json<AcceptInvitation>,
) -> AppResult<impl IntoResponse> {
    let hash = hash_invite_token(input.token.trim());
    let invitation = InvitationRepo::find_by_token_hash(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "invalid invitation token".to_string(),
            ))
        })?;

    if !invitation.is_open(Utc::now()) {
        return Err(AppError::Core(CoreError::Conflict(
            "invitation has expired or was already redeemed".to_string(),
        )));
    }

    // Race-safe: only the first concurrent redeemer flips accepted_at.
    let claimed = InvitationRepo::mark_accepted(&state.pool, invitation.id).await?;
    if !claimed {
        return Err(AppError::Core(CoreError::Conflict(
            "invitation was already redeemed".to_string(),
        )));
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            tenant_id: invitation.tenant_id,
            email: invitation.email.clone(),
            display_name: input.display_name,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        tenant_id = %user.tenant_id,
        "Invitation redeemed"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// DELETE /api/v1/invitations/{id}
///
/// Revoke an invitation belonging to the caller's tenant.
pub async fn delete(
    auth: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let invitation = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    // Foreign invitations read as not found rather than forbidden.
    if invitation.tenant_id != auth.tenant_id && !auth.is_management() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }));
    }

    let deleted = InvitationRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(invitation_id = %id, "Invitation revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))
    }
}
