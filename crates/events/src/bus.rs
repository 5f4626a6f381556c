//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Name of the event published when a batch of requests is created.
pub const REQUEST_CREATED: &str = "request.created";
/// Name of the event published when a request's state or fields change.
pub const REQUEST_UPDATED: &str = "request.updated";
/// Name of the event published when a tenant invites a new user.
pub const INVITATION_CREATED: &str = "invitation.created";

/// A domain event that occurred in the mediation pipeline.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_source`](DomainEvent::with_source),
/// [`with_actor`](DomainEvent::with_actor),
/// [`notify_tenant`](DomainEvent::notify_tenant), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"request.updated"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"request"`, `"invitation"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity id.
    pub source_entity_id: Option<Uuid>,

    /// Tenant whose users should be notified about this event. `None` when
    /// the recipients are named in the payload instead.
    pub notify_tenant_id: Option<Uuid>,

    /// Email of the actor that triggered the event.
    pub actor_email: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            notify_tenant_id: None,
            actor_email: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: Uuid) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, email: impl Into<String>) -> Self {
        self.actor_email = Some(email.into());
        self
    }

    /// Address the event at a tenant's whole user roster.
    pub fn notify_tenant(mut self, tenant_id: Uuid) -> Self {
        self.notify_tenant_id = Some(tenant_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
///
/// # Usage
///
/// ```rust
/// use proxylink_events::bus::{DomainEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new("request.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus whose channel buffers up to `capacity` events.
    ///
    /// Once the buffer fills, the oldest unconsumed events are dropped and
    /// lagging receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// notifications are best-effort by contract.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Open a new receiver that sees every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let request_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let event = DomainEvent::new(REQUEST_UPDATED)
            .with_source("request", request_id)
            .with_actor("agent@assistant.io")
            .notify_tenant(tenant_id)
            .with_payload(serde_json::json!({"status": "Declined"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "request.updated");
        assert_eq!(received.source_entity_type.as_deref(), Some("request"));
        assert_eq!(received.source_entity_id, Some(request_id));
        assert_eq!(received.notify_tenant_id, Some(tenant_id));
        assert_eq!(received.actor_email.as_deref(), Some("agent@assistant.io"));
        assert_eq!(received.payload["status"], "Declined");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new(REQUEST_CREATED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "request.created");
        assert_eq!(e2.event_type, "request.created");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(DomainEvent::new(INVITATION_CREATED));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DomainEvent::new("bare.event");
        assert_eq!(event.event_type, "bare.event");
        assert!(event.source_entity_type.is_none());
        assert!(event.source_entity_id.is_none());
        assert!(event.notify_tenant_id.is_none());
        assert!(event.actor_email.is_none());
        assert!(event.payload.is_object());
    }
}
