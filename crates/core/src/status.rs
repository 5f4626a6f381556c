//! Request lifecycle state machine.
//!
//! Defines the status vocabulary for both request flows and the transition
//! table consulted by the update pipeline. Transitions are keyed by
//! (request type, current status, actor role); anything absent from the
//! table is rejected server-side before any write happens.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::tenant::TenantType;

// ---------------------------------------------------------------------------
// Request type
// ---------------------------------------------------------------------------

/// What the proxy is asking the provider to do for the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Cancellation,
    Discount,
}

impl RequestType {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancellation => "Cancellation",
            Self::Discount => "Discount",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cancellation" => Ok(Self::Cancellation),
            "Discount" => Ok(Self::Discount),
            other => Err(CoreError::Validation(format!(
                "Unknown request type '{other}'. Must be one of: Cancellation, Discount"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request status
// ---------------------------------------------------------------------------

/// Lifecycle state of a request. Wire strings are the human-readable forms
/// ("Save Offered", "Not Qualified") shown in both parties' dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Canceled,
    Declined,
    #[serde(rename = "Save Offered")]
    SaveOffered,
    #[serde(rename = "Save Accepted")]
    SaveAccepted,
    #[serde(rename = "Save Declined")]
    SaveDeclined,
    #[serde(rename = "Save Confirmed")]
    SaveConfirmed,
    Applied,
    #[serde(rename = "Not Qualified")]
    NotQualified,
}

impl RequestStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Canceled => "Canceled",
            Self::Declined => "Declined",
            Self::SaveOffered => "Save Offered",
            Self::SaveAccepted => "Save Accepted",
            Self::SaveDeclined => "Save Declined",
            Self::SaveConfirmed => "Save Confirmed",
            Self::Applied => "Applied",
            Self::NotQualified => "Not Qualified",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Canceled" => Ok(Self::Canceled),
            "Declined" => Ok(Self::Declined),
            "Save Offered" => Ok(Self::SaveOffered),
            "Save Accepted" => Ok(Self::SaveAccepted),
            "Save Declined" => Ok(Self::SaveDeclined),
            "Save Confirmed" => Ok(Self::SaveConfirmed),
            "Applied" => Ok(Self::Applied),
            "Not Qualified" => Ok(Self::NotQualified),
            other => Err(CoreError::Validation(format!(
                "Unknown request status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Status every newly created request starts in.
pub const INITIAL_STATUS: RequestStatus = RequestStatus::Pending;

/// The statuses an actor with `role` may move a request to from `from`.
///
/// `Declined -> Pending` is the recovery loop-back: a proxy that corrected
/// the customer info a provider flagged may resubmit for review. Management
/// actors administer tenants and never drive request state; their row is
/// empty for every state.
pub fn allowed_transitions(
    request_type: RequestType,
    from: RequestStatus,
    role: TenantType,
) -> &'static [RequestStatus] {
    use RequestStatus::*;
    use TenantType::*;

    match (request_type, from, role) {
        (RequestType::Cancellation, Pending, Provider) => &[Declined, Canceled, SaveOffered],
        (RequestType::Cancellation, SaveOffered, Proxy) => &[SaveAccepted, SaveDeclined],
        (RequestType::Cancellation, SaveAccepted, Provider) => &[SaveConfirmed],
        (RequestType::Cancellation, Declined, Proxy) => &[Pending],

        (RequestType::Discount, Pending, Provider) => &[Declined, Applied, NotQualified],
        (RequestType::Discount, Declined, Proxy) => &[Pending],

        _ => &[],
    }
}

/// Check a requested transition against the table.
pub fn validate_transition(
    request_type: RequestType,
    from: RequestStatus,
    to: RequestStatus,
    role: TenantType,
) -> Result<(), CoreError> {
    if allowed_transitions(request_type, from, role).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            request_type,
            from,
            to,
            role,
        })
    }
}
