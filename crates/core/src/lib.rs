//! Domain logic for the ProxyLink request platform.
//!
//! Everything in this crate is pure: the request lifecycle state machine,
//! field-level change detection, response-time metrics, customer field
//! validation, and invitation token generation. Persistence lives in
//! `proxylink-db`, transport in `proxylink-api`.

pub mod changes;
pub mod customer_fields;
pub mod error;
pub mod invite;
pub mod response_time;
pub mod status;
pub mod tenant;
pub mod types;

pub use changes::{
    detect_changes, ChangeActor, CustomerInfo, FieldValue, FlaggedField, RequestChange,
    RequestPatch, RequestSnapshot, SaveOfferDetails,
};
pub use error::CoreError;
pub use response_time::{average_response_time, ResponseTimeSummary, SideAverage};
pub use status::{RequestStatus, RequestType};
pub use tenant::{Participants, TenantType};
pub use types::Timestamp;
