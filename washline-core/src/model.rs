//! Domain data structures for vehicles, service status, and SMS notifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Lifecycle of a vehicle in the wash queue.
pub enum ServiceStatus {
    /// Queued, no work started.
    Waiting,
    /// Crew (or a package) is working on the vehicle.
    InProgress,
    /// Work finished, payment not yet collected.
    PaymentPending,
    /// Paid and handed back.
    Completed,
    /// Removed from the queue without service.
    Cancelled,
}

impl ServiceStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Waiting,
        Self::InProgress,
        Self::PaymentPending,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in-progress",
            Self::PaymentPending => "payment-pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or(ValidationError::InvalidStatus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Size classes priced for cars.
pub enum CarSize {
    /// Hatchbacks and compact sedans.
    Small,
    /// Mid-size sedans.
    Medium,
    /// SUVs and pickups.
    Large,
    /// Vans and oversized vehicles.
    ExtraLarge,
}

impl CarSize {
    /// Every car size.
    pub const ALL: [Self; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    /// Wire representation of the size.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra_large",
        }
    }
}

impl FromStr for CarSize {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == raw)
            .ok_or(ValidationError::InvalidCarSize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Size classes priced for motorcycles.
pub enum MotorcycleSize {
    /// Scooters and underbones.
    Small,
    /// Big bikes.
    Large,
}

impl MotorcycleSize {
    /// Every motorcycle size.
    pub const ALL: [Self; 2] = [Self::Small, Self::Large];

    /// Wire representation of the size.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

impl FromStr for MotorcycleSize {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == raw)
            .ok_or(ValidationError::InvalidMotorcycleSize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Kind of vehicle on an intake form.
pub enum VehicleKind {
    /// Four-wheeled vehicle.
    Car,
    /// Two-wheeled vehicle.
    Motorcycle,
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            VehicleKind::Car => "car",
            VehicleKind::Motorcycle => "motorcycle",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of a single validator call.
///
/// `error` is present exactly when the value is invalid.
pub struct ValidationResult {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// A failing result carrying the user-facing message.
    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// Whether the value passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl From<ValidationError> for ValidationResult {
    fn from(err: ValidationError) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(outcome: Result<(), ValidationError>) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Everything needed to tell a customer their vehicle is ready.
pub struct SmsNotificationData {
    /// Recipient number as entered or normalized.
    pub phone_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Plate of the finished vehicle.
    pub plate_number: String,
    /// Individual services performed.
    #[serde(default)]
    pub services: Vec<String>,
    /// Packages applied.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Amount due, in pesos.
    #[serde(default)]
    pub total_amount: f64,
    /// Human-readable completion timestamp.
    #[serde(default)]
    pub completion_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Normalized result of a notification attempt.
pub struct SmsResponse {
    /// Whether the gateway accepted the message.
    pub success: bool,
    /// Confirmation text on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider message id, only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl SmsResponse {
    /// Confirmation message returned for accepted notifications.
    pub const SENT_MESSAGE: &'static str = "SMS notification sent successfully";

    /// Successful send with an optional provider id.
    #[must_use]
    pub fn sent(sid: Option<String>) -> Self {
        Self {
            success: true,
            message: Some(Self::SENT_MESSAGE.to_owned()),
            error: None,
            sid,
        }
    }

    /// Failed send.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            sid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Message handed to the SMS gateway.
pub struct OutboundSms {
    /// Recipient in the format the gateway expects.
    pub to: String,
    /// Message text.
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Acknowledgement from the relay or the gateway.
pub struct DeliveryReceipt {
    /// Provider message id, when the provider returned one.
    pub sid: Option<String>,
}
