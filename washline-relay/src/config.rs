//! Environment-driven settings for the relay.

use std::env;
use std::time::Duration;

use washline_core::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS};
use washline_provider_twilio::{DEFAULT_API_BASE, TwilioCredentials};

const DEFAULT_BIND: &str = "0.0.0.0:8787";
const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 10_000;

/// Relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listen address.
    pub bind: String,
    /// Emit JSON log lines instead of plain text.
    pub log_json: bool,
    /// Upper bound for one gateway round trip.
    pub gateway_timeout: Duration,
    /// Sends admitted per recipient per window.
    pub rate_limit_max: u32,
    /// Rate limit window in milliseconds.
    pub rate_limit_window_ms: u64,
    /// Gateway host.
    pub api_base: String,
    /// Gateway credentials; `None` when any of them is missing.
    pub credentials: Option<TwilioCredentials>,
}

impl RelayConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let number = |name: &str, default: u64| {
            text(name)
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let credentials = match (
            text("TWILIO_ACCOUNT_SID"),
            text("TWILIO_AUTH_TOKEN"),
            text("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Self {
            bind: text("RELAY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned()),
            log_json: text("RELAY_LOG_JSON").is_some_and(|value| parse_bool(&value)),
            gateway_timeout: Duration::from_millis(number(
                "RELAY_GATEWAY_TIMEOUT_MS",
                DEFAULT_GATEWAY_TIMEOUT_MS,
            )),
            rate_limit_max: u32::try_from(number(
                "RELAY_RATE_LIMIT_MAX",
                u64::from(DEFAULT_MAX_ATTEMPTS),
            ))
            .unwrap_or(u32::MAX),
            rate_limit_window_ms: number("RELAY_RATE_LIMIT_WINDOW_MS", DEFAULT_WINDOW_MS),
            api_base: text("TWILIO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            credentials,
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw, "1" | "true" | "TRUE" | "yes" | "YES")
}
