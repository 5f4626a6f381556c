//! JWT access-token generation and validation.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload. The
//! claims carry the full actor triple (email, tenant id, tenant type) so
//! handlers never need a user lookup to attribute a change.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use proxylink_core::TenantType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the acting user's email address.
    pub sub: String,
    /// The tenant the actor belongs to.
    pub tenant_id: Uuid,
    /// The tenant's side of the mediation (`proxy`, `provider`, `management`).
    pub tenant_type: TenantType,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Per-token UUID, usable for audit correlation.
    pub jti: String,
}

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes. `JWT_ACCESS_EXPIRY_MINS`,
    /// default `60`.
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Read JWT settings from the environment.
    ///
    /// # Panics
    ///
    /// `JWT_SECRET` has no default: startup panics when it is unset or
    /// empty rather than running with a guessable secret.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|raw| {
                raw.parse()
                    .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64")
            })
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Sign an HS256 access token for the given actor triple.
pub fn generate_access_token(
    email: &str,
    tenant_id: Uuid,
    tenant_type: TenantType,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: email.to_string(),
        tenant_id,
        tenant_type,
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a token's signature and expiry, returning its [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, checks exp
    )
    .map(|data| data.claims)
}
