//! Invitation entity model and DTOs.

use proxylink_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full invitation row from the `invitations` table.
///
/// Contains the token hash -- NEVER serialize this to API responses
/// directly. Use [`InvitationResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    /// Email of the user who sent the invitation.
    pub invited_by: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Invitation {
    /// Whether the invitation can still be redeemed at `now`.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.accepted_at.is_none() && self.expires_at > now
    }
}

/// Safe invitation representation for API responses (no token hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub invited_by: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<Invitation> for InvitationResponse {
    fn from(row: Invitation) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            email: row.email,
            invited_by: row.invited_by,
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
            created_at: row.created_at,
        }
    }
}

/// Response for invitation creation. The plaintext token appears here and
/// nowhere else; afterwards only its hash exists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCreatedResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub invited_by: String,
    /// The one-time plaintext token to hand to the invitee.
    pub token: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new invitation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitation {
    pub email: String,
}

/// DTO for redeeming an invitation token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitation {
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
