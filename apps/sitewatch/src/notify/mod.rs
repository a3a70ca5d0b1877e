//! Outbound alerts for sites that are down.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Smtp;

pub mod email;

pub use email::SmtpNotifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid mailbox {address:?}: {source}")]
    Address { address: String, source: lettre::address::AddressError },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("no SMTP password configured (set SITEWATCH_SMTP_PASSWORD)")]
    MissingCredential,
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// A channel that can deliver an alert message.
///
/// Implementations report failures instead of retrying; a failed alert is dropped.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends `message` using the given SMTP settings.
    async fn send(&self, config: &Smtp, message: &str) -> Result<(), NotifyError>;
}

/// Render the line logged after a delivery attempt
pub fn outcome_line(message: &str, result: &Result<(), NotifyError>) -> String {
    match result {
        Ok(()) => format!("Notification sent: {message}"),
        Err(e) => format!("Failed to send notification: {e}"),
    }
}
