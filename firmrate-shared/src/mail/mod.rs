/// Transactional email delivery
///
/// This module defines the contract for the notification collaborator and
/// its SMTP implementation. All content is plain text, no attachments.
///
/// # Delivery Contract
///
/// Email is strictly best-effort: workflows commit their database state
/// first and spawn delivery afterwards via [`send_best_effort`]. A failed
/// or slow SMTP relay never rolls back or delays a committed mutation;
/// failures are logged at warn and nothing is surfaced to the end user.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use firmrate_shared::mail::{send_best_effort, MailConfig, Mailer, SmtpMailer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MailConfig {
///     smtp_host: "smtp.gmail.com".to_string(),
///     smtp_port: 587,
///     username: std::env::var("MAIL_USERNAME")?,
///     password: std::env::var("MAIL_PASSWORD")?,
///     from: "recenze@firmrate.cz".to_string(),
/// };
///
/// let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config)?);
///
/// send_best_effort(
///     mailer,
///     vec!["user@example.com".to_string()],
///     "Vítejte".to_string(),
///     "Děkujeme za registraci.".to_string(),
/// );
/// # Ok(())
/// # }
/// ```

pub mod messages;

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Error type for mail operations
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport could not be constructed
    #[error("Failed to build SMTP transport: {0}")]
    Transport(String),

    /// An address could not be parsed
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    /// The message could not be built or sent
    #[error("Failed to send mail: {0}")]
    Send(String),
}

/// SMTP relay configuration
///
/// Credentials come from environment variables (`MAIL_USERNAME`,
/// `MAIL_PASSWORD`); host and port default to a STARTTLS relay on 587.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay hostname
    pub smtp_host: String,

    /// SMTP relay port (STARTTLS)
    pub smtp_port: u16,

    /// Relay login username
    pub username: String,

    /// Relay login password
    pub password: String,

    /// Sender address for all outgoing mail
    pub from: String,
}

/// Notification collaborator contract
///
/// One method: deliver a plain-text message to a list of recipients.
/// The trait seam exists so tests can swap in [`NoopMailer`] and exercise
/// workflows without a relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a plain-text message to `to`
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), MailError>;
}

/// Production mailer over an async SMTP STARTTLS transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport from configuration
    ///
    /// # Errors
    ///
    /// Returns `MailError::Transport` if the relay hostname is rejected,
    /// `MailError::InvalidAddress` if the sender address does not parse.
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", config.from, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject);

        for recipient in to {
            let mailbox = recipient
                .parse::<Mailbox>()
                .map_err(|e| MailError::InvalidAddress(format!("{}: {}", recipient, e)))?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .body(body.to_string())
            .map_err(|e| MailError::Send(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        debug!(recipients = to.len(), subject, "Mail delivered");
        Ok(())
    }
}

/// Mailer that drops everything, for tests and local development
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &[String], subject: &str, _body: &str) -> Result<(), MailError> {
        debug!(recipients = to.len(), subject, "NoopMailer: dropping mail");
        Ok(())
    }
}

/// Spawns a fire-and-forget delivery
///
/// Call after the surrounding database work has committed. Failures are
/// logged and otherwise swallowed.
pub fn send_best_effort(mailer: Arc<dyn Mailer>, to: Vec<String>, subject: String, body: String) {
    if to.is_empty() {
        return;
    }

    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &body).await {
            warn!(error = %e, subject = %subject, "Mail delivery failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_mailer_accepts_anything() {
        let mailer = NoopMailer;
        let result = mailer
            .send(
                &["user@example.com".to_string()],
                "Předmět",
                "Tělo zprávy",
            )
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_from_address() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "user".to_string(),
            password: "pass".to_string(),
            from: "not an address".to_string(),
        };

        assert!(matches!(
            SmtpMailer::new(config),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_send_best_effort_empty_recipients_is_noop() {
        // Must not spawn or panic with nothing to deliver
        send_best_effort(
            Arc::new(NoopMailer),
            vec![],
            "Předmět".to_string(),
            "Tělo".to_string(),
        );
    }
}
