//! Tenant roles and request participant tracking.
//!
//! Every organization on the platform is a tenant with exactly one role:
//! proxies submit requests on behalf of end customers, providers respond to
//! them, and management administers the platform without owning requests.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The role of a tenant organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantType {
    Proxy,
    Provider,
    Management,
}

impl TenantType {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Provider => "provider",
            Self::Management => "management",
        }
    }
}

impl std::fmt::Display for TenantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TenantType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proxy" => Ok(Self::Proxy),
            "provider" => Ok(Self::Provider),
            "management" => Ok(Self::Management),
            other => Err(CoreError::Validation(format!(
                "Unknown tenant type '{other}'. Must be one of: proxy, provider, management"
            ))),
        }
    }
}

/// Emails of the users who have touched a request, grouped by side.
///
/// Maintained by the update pipeline (an actor is recorded on first touch),
/// never by client patches, and excluded from change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub proxy: Vec<String>,
    pub provider: Vec<String>,
}

impl Participants {
    /// A fresh participant set containing only the submitting proxy user.
    pub fn submitter(email: &str) -> Self {
        Self {
            proxy: vec![email.to_string()],
            provider: Vec::new(),
        }
    }

    /// Record an actor on their side of the request. Idempotent; management
    /// actors belong to neither side and are not recorded.
    pub fn record(&mut self, role: TenantType, email: &str) {
        let side = match role {
            TenantType::Proxy => &mut self.proxy,
            TenantType::Provider => &mut self.provider,
            TenantType::Management => return,
        };
        if !side.iter().any(|e| e == email) {
            side.push(email.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_returns_wire_strings() {
        assert_eq!(TenantType::Proxy.as_str(), "proxy");
        assert_eq!(TenantType::Provider.as_str(), "provider");
        assert_eq!(TenantType::Management.as_str(), "management");
    }

    #[test]
    fn parse_rejects_unknown_role() {
        assert!("proxy".parse::<TenantType>().is_ok());
        assert!("customer".parse::<TenantType>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&TenantType::Management).unwrap();
        assert_eq!(json, "\"management\"");
    }

    #[test]
    fn record_is_idempotent_per_email() {
        let mut p = Participants::submitter("a@proxy.io");
        p.record(TenantType::Proxy, "a@proxy.io");
        p.record(TenantType::Provider, "b@provider.io");
        p.record(TenantType::Provider, "b@provider.io");
        assert_eq!(p.proxy, vec!["a@proxy.io"]);
        assert_eq!(p.provider, vec!["b@provider.io"]);
    }

    #[test]
    fn management_actors_are_not_recorded() {
        let mut p = Participants::default();
        p.record(TenantType::Management, "admin@platform.io");
        assert!(p.proxy.is_empty());
        assert!(p.provider.is_empty());
    }
}
