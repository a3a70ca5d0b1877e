use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

use super::{NotificationSender, NotifyError};
use crate::config::Smtp;

pub const ALERT_SUBJECT: &str = "Website Status Alert";

/// Sends plaintext alert mails over SMTP with a STARTTLS upgrade.
///
/// A fresh session is opened for every alert and closed when the send returns.
#[derive(Debug, Default)]
pub struct SmtpNotifier;

impl SmtpNotifier {
    pub fn new() -> Self {
        Self
    }

    fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
        address
            .parse()
            .map_err(|source| NotifyError::Address { address: address.to_string(), source })
    }

    /// Build the alert mail for `body`
    pub fn build_message(config: &Smtp, body: &str) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(Self::parse_mailbox(&config.sender)?)
            .to(Self::parse_mailbox(&config.receiver)?)
            .subject(ALERT_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?)
    }
}

#[async_trait]
impl NotificationSender for SmtpNotifier {
    async fn send(&self, config: &Smtp, message: &str) -> Result<(), NotifyError> {
        let password = config.password.clone().ok_or(NotifyError::MissingCredential)?;
        let email = Self::build_message(config, message)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port)
            .credentials(Credentials::new(config.login().to_string(), password))
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .build();

        debug!(server = %config.server, port = config.port, "Sending alert mail");
        transport.send(email).await?;
        Ok(())
    }
}
