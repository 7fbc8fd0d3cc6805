//! Operator notification: the trait seam plus the SMTP mailer.
//!
//! Delivery failure is the caller's problem to surface; the journal is
//! never rolled back for it, so a signature stays suppressed even when the
//! mail bounced.

use canarywatch_core::config::SmtpConfig;
use canarywatch_core::signature::Signature;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address {address:?}: {detail}")]
    Address { address: String, detail: String },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp relay setup failed: {0}")]
    Transport(#[source] lettre::transport::smtp::Error),

    #[error("smtp delivery to {recipient} failed: {source}")]
    Delivery {
        recipient: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// Notification seam: deliver a non-empty, ordered list of problem
/// signatures to a fixed set of recipients.
pub trait Notifier {
    fn notify(
        &self,
        results: &[Signature],
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// SMTP mailer: one message per recipient over a TLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
    monitor_name: String,
}

impl SmtpNotifier {
    pub fn new(
        config: &SmtpConfig,
        password: String,
        monitor_name: &str,
    ) -> Result<Self, NotifyError> {
        // Addresses are validated before the transport exists, so a config
        // mistake fails without ever opening a connection pool.
        let from = parse_mailbox(&config.from)?;
        let recipients = config
            .recipients
            .iter()
            .map(|r| parse_mailbox(r))
            .collect::<Result<Vec<_>, _>>()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(NotifyError::Transport)?
            .credentials(Credentials::new(config.username.clone(), password))
            .build();
        Ok(Self {
            transport,
            from,
            recipients,
            monitor_name: monitor_name.to_string(),
        })
    }
}

fn alert_subject(monitor_name: &str, count: usize) -> String {
    format!("ALERT: {monitor_name} page change ({count})")
}

fn alert_body(monitor_name: &str, results: &[Signature]) -> String {
    let problems = results
        .iter()
        .map(Signature::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{problems}\n\n\n\nSincerely,\n\n{monitor_name}")
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, results: &[Signature]) -> Result<(), NotifyError> {
        let subject = alert_subject(&self.monitor_name, results.len());
        let body = alert_body(&self.monitor_name, results);

        for recipient in &self.recipients {
            tracing::warn!(recipient = %recipient, "sending alert mail");
            let message = Message::builder()
                .from(self.from.clone())
                .to(recipient.clone())
                .subject(subject.clone())
                .body(body.clone())?;
            self.transport
                .send(message)
                .await
                .map_err(|source| NotifyError::Delivery {
                    recipient: recipient.to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| NotifyError::Address {
            address: address.to_string(),
            detail: e.to_string(),
        })
}
