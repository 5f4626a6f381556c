//! Event-to-email notification routing.
//!
//! [`NotificationMailer`] subscribes to the domain event bus and turns each
//! event into outbound email for the affected tenant's users. Delivery is
//! best-effort: failures are logged and never surface to the request that
//! published the event.

use tokio::sync::broadcast;

use proxylink_db::repositories::UserRepo;
use proxylink_db::DbPool;
use proxylink_events::{DomainEvent, EmailDelivery, INVITATION_CREATED};

/// Routes domain events to email recipients.
///
/// Consumes events from the broadcast channel and, for each event, resolves
/// the recipient addresses and hands them to the SMTP delivery service.
/// Without SMTP configuration the mailer still runs and logs each event it
/// would have sent.
pub struct NotificationMailer {
    pool: DbPool,
    delivery: Option<EmailDelivery>,
}

impl NotificationMailer {
    /// Create a mailer. `delivery` is `None` when SMTP is not configured.
    pub fn new(pool: DbPool, delivery: Option<EmailDelivery>) -> Self {
        Self { pool, delivery }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](proxylink_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification mailer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification mailer shutting down");
                    break;
                }
            }
        }
    }

    /// Resolve recipients for a single event and deliver to each.
    async fn route_event(&self, event: &DomainEvent) -> Result<(), sqlx::Error> {
        let recipients = self.determine_recipients(event).await?;
        if recipients.is_empty() {
            return Ok(());
        }

        let Some(delivery) = &self.delivery else {
            tracing::debug!(
                event_type = %event.event_type,
                recipients = recipients.len(),
                "SMTP not configured, notification logged only"
            );
            return Ok(());
        };

        for email in &recipients {
            if let Err(e) = delivery.deliver(email, event).await {
                tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    "Email delivery failed"
                );
            }
        }

        Ok(())
    }

    /// Determine which addresses should hear about the event.
    ///
    /// Invitations carry their single recipient in the payload; everything
    /// else fans out to the user roster of the tenant named on the event.
    async fn determine_recipients(&self, event: &DomainEvent) -> Result<Vec<String>, sqlx::Error> {
        if event.event_type == INVITATION_CREATED {
            let invitee = event
                .payload
                .get("email")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            return Ok(invitee.into_iter().collect());
        }

        match event.notify_tenant_id {
            Some(tenant_id) => {
                let users = UserRepo::list_for_tenant(&self.pool, tenant_id).await?;
                Ok(users.into_iter().map(|u| u.email).collect())
            }
            None => Ok(vec![]),
        }
    }
}
