//! Notification port that hands completion notices to the SMS relay function.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use washline_core::{
    model::{DeliveryReceipt, SmsNotificationData},
    ports::{PortError, SmsRelayPort},
};

const USER_AGENT: &str = "washline/0.1";

/// Body returned by the relay, on success and on failure.
#[derive(Debug, Default, Deserialize)]
struct RelayReply {
    #[serde(default)]
    success: bool,
    sid: Option<String>,
    error: Option<String>,
}

/// Relay port backed by an HTTP POST to the relay endpoint.
pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    /// Create a port bound to the given HTTP client and relay URL.
    #[must_use]
    pub fn new<E: Into<String>>(client: Client, endpoint: E) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create a port with its own client that gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when the HTTP client cannot be built.
    pub fn with_timeout<E: Into<String>>(
        endpoint: E,
        timeout: Duration,
    ) -> Result<Self, PortError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::new(client, endpoint))
    }
}

#[async_trait]
impl SmsRelayPort for RelayClient {
    async fn relay(
        &self,
        notification: &SmsNotificationData,
    ) -> Result<DeliveryReceipt, PortError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        // Error pages from proxies are not JSON; fall back to the status line.
        let reply: RelayReply = serde_json::from_str(&body).unwrap_or_default();

        if status.is_success() && reply.success {
            return Ok(DeliveryReceipt { sid: reply.sid });
        }

        Err(PortError::Relay(reply.error.unwrap_or_else(|| {
            format!("SMS relay responded with status {status}")
        })))
    }
}
