//! HTTP relay between washline clients and the SMS gateway.
//!
//! Clients post a completion notice to [`SEND_SMS_PATH`]; the relay checks the
//! required fields, fails closed when the gateway is not configured, composes
//! the message, and makes exactly one gateway call.

/// Environment-driven settings.
pub mod config;
/// Request decoding and message composition.
pub mod message;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};
use washline_core::{
    model::OutboundSms,
    ports::{PortError, SmsGatewayPort},
    rate_limit::RateLimiter,
};
use washline_provider_twilio::TwilioGateway;

pub use config::RelayConfig;
pub use message::{PreparedSms, RelayRequest, RequestError};

/// Path of the send endpoint.
pub const SEND_SMS_PATH: &str = "/send-sms";

const RATE_LIMITED: &str = "Too many SMS requests for this number, please try again later";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    gateway: Option<Arc<dyn SmsGatewayPort>>,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// State around an explicit gateway; `None` means credentials are missing.
    #[must_use]
    pub fn new(gateway: Option<Arc<dyn SmsGatewayPort>>, limiter: RateLimiter) -> Self {
        Self {
            gateway,
            limiter: Arc::new(limiter),
        }
    }

    /// Build the Twilio gateway and per-recipient limiter from settings.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when the HTTP client cannot be built.
    pub fn from_config(config: &RelayConfig) -> Result<Self, PortError> {
        let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window_ms);
        let gateway = match &config.credentials {
            Some(credentials) => {
                let client = TwilioGateway::http_client(config.gateway_timeout)?;
                let gateway =
                    TwilioGateway::with_base_url(client, &config.api_base, credentials.clone());
                Some(Arc::new(gateway) as Arc<dyn SmsGatewayPort>)
            }
            None => {
                warn!("gateway credentials missing; send requests will be refused");
                None
            }
        };
        Ok(Self::new(gateway, limiter))
    }
}

/// Body of every send response except precondition failures.
#[derive(Debug, Serialize)]
struct SendReply {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Body of 400 and 405 responses.
#[derive(Debug, Serialize)]
struct PreconditionReply {
    error: String,
}

/// Assemble the relay routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(SEND_SMS_PATH, post(send_sms).fallback(method_not_allowed))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> Response {
    precondition(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn send_sms(State(state): State<AppState>, body: Bytes) -> Response {
    let prepared = match RelayRequest::from_slice(&body).and_then(RelayRequest::prepare) {
        Ok(prepared) => prepared,
        Err(err) => {
            warn!(error = %err, "rejected SMS request");
            return precondition(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let Some(gateway) = state.gateway.as_ref() else {
        error!(plate = %prepared.plate_number, "SMS gateway credentials are not configured");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &PortError::NotConfigured);
    };

    if !state.limiter.is_allowed(&prepared.limit_key) {
        warn!(plate = %prepared.plate_number, "SMS rate limit reached for recipient");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(SendReply {
                success: false,
                sid: None,
                error: Some(RATE_LIMITED.to_owned()),
            }),
        )
            .into_response();
    }

    let message = OutboundSms {
        to: prepared.recipient,
        body: prepared.body,
    };
    match gateway.send(&message).await {
        Ok(receipt) => {
            info!(
                plate = %prepared.plate_number,
                sid = receipt.sid.as_deref().unwrap_or("-"),
                "SMS sent"
            );
            (
                StatusCode::OK,
                Json(SendReply {
                    success: true,
                    sid: receipt.sid,
                    error: None,
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!(plate = %prepared.plate_number, error = %err, "SMS gateway call failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

fn precondition(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(PreconditionReply {
            error: error.into(),
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, err: &PortError) -> Response {
    (
        status,
        Json(SendReply {
            success: false,
            sid: None,
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}
