//! Traits describing the notification relay and SMS gateway backends.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{DeliveryReceipt, OutboundSms, SmsNotificationData};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while handing a message to the relay or the gateway.
pub enum PortError {
    /// Network layer failed or timed out.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Gateway answered with a non-success status.
    #[error("SMS gateway error ({status}): {message}")]
    Gateway {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Gateway-supplied description, or the status text.
        message: String,
    },
    /// Relay reported a failure of its own.
    #[error("{0}")]
    Relay(String),
    /// Gateway credentials are missing.
    #[error("SMS service not configured")]
    NotConfigured,
    /// Recipient number cannot receive SMS.
    #[error("Invalid phone number: {0}")]
    InvalidRecipient(String),
}

#[async_trait]
/// Remote function that relays completion notifications to the gateway.
pub trait SmsRelayPort: Send + Sync {
    /// Submit one notification.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the relay is unreachable or reports a failure.
    async fn relay(&self, notification: &SmsNotificationData) -> Result<DeliveryReceipt, PortError>;
}

#[async_trait]
/// Third-party SMS provider.
pub trait SmsGatewayPort: Send + Sync {
    /// Send a single message.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] on transport failure or a non-2xx gateway response.
    async fn send(&self, message: &OutboundSms) -> Result<DeliveryReceipt, PortError>;
}
