//! Inbound relay payloads and the SMS text composed from them.

use std::fmt;

use serde::Deserialize;

use washline_core::phone::format_phone_number;
use washline_core::sanitize_input;
use washline_core::validation::normalize_plate;

const SIGN_OFF: &str = "Thank you for choosing our car wash!";

#[derive(thiserror::Error, Debug)]
/// Reasons a relay request is rejected before any gateway call.
pub enum RequestError {
    /// Body is not the expected JSON.
    #[error("Invalid request body: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Required fields are absent or blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// Queue position, sent as a number by newer screens and as text by older ones.
pub enum QueueNumber {
    /// Numeric position.
    Number(u64),
    /// Free-form label.
    Text(String),
}

impl fmt::Display for QueueNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueNumber::Number(number) => write!(formatter, "{number}"),
            QueueNumber::Text(text) => formatter.write_str(text),
        }
    }
}

/// Body accepted on the relay endpoint.
///
/// Covers the current completion payload and the older status-update payload
/// (`status`, `serviceType`, `queueNumber`, no `customerName`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    phone_number: Option<String>,
    customer_name: Option<String>,
    plate_number: Option<String>,
    services: Option<Vec<String>>,
    packages: Option<Vec<String>>,
    total_amount: Option<f64>,
    completion_time: Option<String>,
    status: Option<String>,
    service_type: Option<String>,
    queue_number: Option<QueueNumber>,
}

/// Message ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSms {
    /// Recipient without a leading `+`.
    pub recipient: String,
    /// Recipient in `+63` form, so every spelling of one handset shares a key.
    pub limit_key: String,
    /// Normalized plate, for logging.
    pub plate_number: String,
    /// Message text.
    pub body: String,
}

impl RelayRequest {
    /// Decode a request body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Malformed`] when the body is not a JSON object
    /// of the expected shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        Ok(serde_json::from_slice(body)?)
    }

    fn is_legacy(&self) -> bool {
        self.status.is_some() && self.customer_name.is_none()
    }

    /// Check required fields and compose the outgoing message.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingFields`] naming every absent field.
    pub fn prepare(self) -> Result<PreparedSms, RequestError> {
        if self.is_legacy() {
            self.prepare_status_update()
        } else {
            self.prepare_completion()
        }
    }

    fn prepare_completion(self) -> Result<PreparedSms, RequestError> {
        let phone = present(self.phone_number.as_deref());
        let name = present(self.customer_name.as_deref()).map(sanitize_input);
        let plate = present(self.plate_number.as_deref()).map(clean_plate);

        let (Some(phone), Some(name), Some(plate)) = (phone, name.as_ref(), plate.as_ref())
        else {
            return Err(missing_fields(&[
                ("phoneNumber", phone.is_some()),
                ("customerName", name.is_some()),
                ("plateNumber", plate.is_some()),
            ]));
        };

        let mut lines = vec![format!(
            "Hi {name}! Your vehicle {plate} is done and ready for pickup."
        )];
        let services = clean_list(self.services.as_deref().unwrap_or_default());
        if !services.is_empty() {
            lines.push(format!("Services: {}", services.join(", ")));
        }
        let packages = clean_list(self.packages.as_deref().unwrap_or_default());
        if !packages.is_empty() {
            lines.push(format!("Packages: {}", packages.join(", ")));
        }
        if let Some(amount) = self.total_amount.filter(|amount| *amount > 0.0) {
            lines.push(format!("Total: PHP {amount:.2}"));
        }
        if let Some(time) = present(self.completion_time.as_deref()) {
            lines.push(format!("Completed: {}", sanitize_input(time)));
        }
        lines.push(SIGN_OFF.to_owned());

        Ok(PreparedSms {
            recipient: gateway_recipient(phone),
            limit_key: format_phone_number(phone),
            plate_number: plate.clone(),
            body: lines.join("\n"),
        })
    }

    fn prepare_status_update(self) -> Result<PreparedSms, RequestError> {
        let phone = present(self.phone_number.as_deref());
        let plate = present(self.plate_number.as_deref()).map(clean_plate);
        let status = present(self.status.as_deref()).map(sanitize_input);

        let (Some(phone), Some(plate), Some(status)) = (phone, plate.as_ref(), status.as_ref())
        else {
            return Err(missing_fields(&[
                ("phoneNumber", phone.is_some()),
                ("plateNumber", plate.is_some()),
                ("status", status.is_some()),
            ]));
        };

        let service = present(self.service_type.as_deref())
            .map_or_else(|| "car wash".to_owned(), sanitize_input);
        let queue = self
            .queue_number
            .map(|queue| format!(" (queue #{})", sanitize_input(&queue.to_string())))
            .unwrap_or_default();

        let body = format!(
            "Your {service} for {plate}{queue} is now {}.\n{SIGN_OFF}",
            status.replace('-', " ")
        );

        Ok(PreparedSms {
            recipient: gateway_recipient(phone),
            limit_key: format_phone_number(phone),
            plate_number: plate.clone(),
            body,
        })
    }
}

fn missing_fields(fields: &[(&'static str, bool)]) -> RequestError {
    RequestError::MissingFields(
        fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect(),
    )
}

fn present(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

fn clean_plate(raw: &str) -> String {
    normalize_plate(&sanitize_input(raw))
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| sanitize_input(item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// The gateway receives the number without its leading `+`.
fn gateway_recipient(phone: &str) -> String {
    phone.strip_prefix('+').unwrap_or(phone).to_owned()
}
