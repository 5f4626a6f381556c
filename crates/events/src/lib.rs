//! ProxyLink event bus and notification infrastructure.
//!
//! This crate provides the building blocks for in-process domain events:
//!
//! - [`EventBus`] — publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical event envelope.
//! - [`delivery`] — external delivery channels (email).
//!
//! Events are advisory: publishing never blocks request handling, and a
//! dropped event costs at most a notification email.

pub mod bus;
pub mod delivery;

pub use bus::{DomainEvent, EventBus, INVITATION_CREATED, REQUEST_CREATED, REQUEST_UPDATED};
pub use delivery::email::{EmailConfig, EmailDelivery};
