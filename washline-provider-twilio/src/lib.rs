//! SMS gateway implementation for the Twilio Messages API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use washline_core::{
    model::{DeliveryReceipt, OutboundSms},
    ports::{PortError, SmsGatewayPort},
};

/// Production API host.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

const USER_AGENT: &str = "washline/0.1";

/// Account credentials and sender number.
#[derive(Clone)]
pub struct TwilioCredentials {
    /// Account SID, also the basic-auth user.
    pub account_sid: String,
    /// Auth token, the basic-auth password.
    pub auth_token: String,
    /// Sender number registered on the account.
    pub from_number: String,
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Message resource returned by `POST …/Messages.json`.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

/// Error body Twilio sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Gateway port that sends through Twilio.
pub struct TwilioGateway {
    client: Client,
    base_url: String,
    credentials: TwilioCredentials,
}

impl TwilioGateway {
    /// Create a gateway against the production API.
    #[must_use]
    pub fn new(client: Client, credentials: TwilioCredentials) -> Self {
        Self::with_base_url(client, DEFAULT_API_BASE, credentials)
    }

    /// Create a gateway against another API host, e.g. a local stand-in.
    #[must_use]
    pub fn with_base_url<B: Into<String>>(
        client: Client,
        base_url: B,
        credentials: TwilioCredentials,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    /// HTTP client for gateway calls that gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when the client cannot be built.
    pub fn http_client(timeout: Duration) -> Result<Client, PortError> {
        Ok(Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl SmsGatewayPort for TwilioGateway {
    async fn send(&self, message: &OutboundSms) -> Result<DeliveryReceipt, PortError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[
                ("To", message.to.as_str()),
                ("From", self.credentials.from_number.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await?;

        let resource: MessageResource = ensure_success(response).await?.json().await?;
        Ok(DeliveryReceipt { sid: resource.sid })
    }
}

// Turn a non-2xx answer into a gateway error that keeps the status code.
async fn ensure_success(response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|error| error.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_owned()
        });

    Err(PortError::Gateway {
        status: status.as_u16(),
        message,
    })
}
