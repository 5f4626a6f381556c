use std::fmt::Debug;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Server configuration, read once from the environment at startup.
///
/// Every field has a local-development default; production deployments
/// override through environment variables. Malformed values panic during
/// startup rather than surfacing later.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address. `HOST`, default `0.0.0.0`.
    pub host: String,
    /// Bind port. `PORT`, default `3000`.
    pub port: u16,
    /// Allowed CORS origins. Comma-separated `CORS_ORIGINS`, default
    /// `http://localhost:5173`.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds. `REQUEST_TIMEOUT_SECS`, default `30`.
    pub request_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000),
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
/// Panics when the variable is set but does not parse.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid number: {e:?}")),
        Err(_) => default,
    }
}
