//! SMTP delivery of notification email.
//!
//! [`EmailDelivery`] renders a [`DomainEvent`] into a short plain-text
//! message and hands it to the `lettre` async SMTP transport. Configuration
//! comes from the environment; without `SMTP_HOST` set,
//! [`EmailConfig::from_env`] returns `None` and callers skip delivery
//! entirely.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::bus::{DomainEvent, INVITATION_CREATED, REQUEST_CREATED, REQUEST_UPDATED};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@proxylink.local";

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname. `SMTP_HOST`, required.
    pub smtp_host: String,
    /// SMTP server port. `SMTP_PORT`, default `587`.
    pub smtp_port: u16,
    /// RFC 5322 "From" address. `SMTP_FROM`, default
    /// `noreply@proxylink.local`.
    pub from_address: String,
    /// SMTP username. `SMTP_USER`, optional.
    pub smtp_user: Option<String>,
    /// SMTP password. `SMTP_PASSWORD`, optional.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Read SMTP settings from the environment.
    ///
    /// `None` when `SMTP_HOST` is unset: the deployment has no mail
    /// relay and delivery is disabled.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        let smtp_port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);
        let from_address =
            std::env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string());

        Some(Self {
            smtp_host,
            smtp_port,
            from_address,
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

/// Human subject line for a domain event.
fn subject_for(event: &DomainEvent) -> String {
    let summary = match event.event_type.as_str() {
        REQUEST_CREATED => "New support request",
        REQUEST_UPDATED => "Support request updated",
        INVITATION_CREATED => "You have been invited to ProxyLink",
        other => other,
    };
    format!("[ProxyLink] {summary}")
}

/// Plain-text body for a domain event.
///
/// Invitations get a redeemable message with the token itself; request
/// events get a one-line status summary. Unknown event types fall back
/// to a raw payload dump so nothing is ever silently dropped.
fn body_for(event: &DomainEvent) -> String {
    let payload = &event.payload;
    match event.event_type.as_str() {
        INVITATION_CREATED => format!(
            "You have been invited to join ProxyLink.\n\n\
             Your invitation token:\n\n    {}\n\n\
             The token expires at {}.",
            payload["token"].as_str().unwrap_or("(missing)"),
            payload["expiresAt"].as_str().unwrap_or("(unknown)"),
        ),
        REQUEST_CREATED => format!(
            "A new {} request is awaiting your response.\n\nRequest: {}",
            payload["requestType"].as_str().unwrap_or("support"),
            event.source_entity_id.map_or_else(String::new, |id| id.to_string()),
        ),
        REQUEST_UPDATED => format!(
            "A request you participate in moved to \"{}\".\n\nRequest: {}",
            payload["status"].as_str().unwrap_or("updated"),
            event.source_entity_id.map_or_else(String::new, |id| id.to_string()),
        ),
        _ => format!(
            "Event: {}\nTime: {}\nDetails: {}",
            event.event_type,
            event.timestamp,
            serde_json::to_string_pretty(payload).unwrap_or_default()
        ),
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails for domain events via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a delivery service with the given SMTP settings.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Render `event` and send it to `to_email`.
    pub async fn deliver(&self, to_email: &str, event: &DomainEvent) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject_for(event))
            .header(ContentType::TEXT_PLAIN)
            .body(body_for(event))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport()?.send(email).await?;

        tracing::info!(to = to_email, event_type = %event.event_type, "Notification email sent");
        Ok(())
    }

    /// STARTTLS transport for the configured relay, with credentials when
    /// both username and password are present.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
