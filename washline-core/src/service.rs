//! Notification dispatcher used when a vehicle is ready for pickup.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info};

use crate::model::{SmsNotificationData, SmsResponse, VehicleKind};
use crate::phone::{format_phone_number, validate_phone_number};
use crate::ports::{PortError, SmsRelayPort};

const COMPLETION_TIME_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

#[derive(Debug, Clone, Default)]
/// A finished vehicle as the queue screens know it.
pub struct CompletedVehicle {
    /// Contact number on the ticket.
    pub phone_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Vehicle plate.
    pub plate_number: String,
    /// Individual services performed.
    pub services: Vec<String>,
    /// Packages applied.
    pub packages: Vec<String>,
    /// Amount due, when known.
    pub total_amount: Option<f64>,
}

impl CompletedVehicle {
    /// Vehicle with no services, packages, or amount recorded.
    #[must_use]
    pub fn new<P: Into<String>, N: Into<String>, L: Into<String>>(
        phone_number: P,
        customer_name: N,
        plate_number: L,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            customer_name: customer_name.into(),
            plate_number: plate_number.into(),
            ..Self::default()
        }
    }

    /// Attach the services performed.
    #[must_use]
    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.services = services;
        self
    }

    /// Attach the packages applied.
    #[must_use]
    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    /// Attach the amount due.
    #[must_use]
    pub fn with_total_amount(mut self, total_amount: f64) -> Self {
        self.total_amount = Some(total_amount);
        self
    }
}

/// Public entry point for customer notifications.
///
/// Every call resolves to an [`SmsResponse`]; relay and transport failures are
/// logged here and returned as `success: false`. Nothing is retried.
pub struct NotificationService {
    relay: Arc<dyn SmsRelayPort>,
}

impl NotificationService {
    /// Create a dispatcher bound to the given relay.
    #[must_use]
    pub fn new(relay: Arc<dyn SmsRelayPort>) -> Self {
        Self { relay }
    }

    /// Send a completion notice.
    ///
    /// The phone number is normalized to `+63…` first; numbers that do not
    /// normalize to a mobile number fail without contacting the relay.
    pub async fn send_completion_notification(
        &self,
        mut notification: SmsNotificationData,
    ) -> SmsResponse {
        if !validate_phone_number(&notification.phone_number) {
            let err = PortError::InvalidRecipient(notification.phone_number.clone());
            error!(plate = %notification.plate_number, error = %err, "completion SMS not sent");
            return SmsResponse::failed(err.to_string());
        }
        notification.phone_number = format_phone_number(&notification.phone_number);

        match self.relay.relay(&notification).await {
            Ok(receipt) => {
                info!(
                    plate = %notification.plate_number,
                    sid = receipt.sid.as_deref().unwrap_or("-"),
                    "completion SMS sent"
                );
                SmsResponse::sent(receipt.sid)
            }
            Err(err) => {
                error!(plate = %notification.plate_number, error = %err, "completion SMS failed");
                SmsResponse::failed(err.to_string())
            }
        }
    }

    /// Notify the owner of a finished car.
    pub async fn send_car_completion_sms(&self, vehicle: CompletedVehicle) -> SmsResponse {
        self.send_completed(VehicleKind::Car, vehicle).await
    }

    /// Notify the owner of a finished motorcycle.
    pub async fn send_motorcycle_completion_sms(&self, vehicle: CompletedVehicle) -> SmsResponse {
        self.send_completed(VehicleKind::Motorcycle, vehicle).await
    }

    async fn send_completed(&self, kind: VehicleKind, vehicle: CompletedVehicle) -> SmsResponse {
        info!(%kind, plate = %vehicle.plate_number, "dispatching completion SMS");
        let notification = SmsNotificationData {
            phone_number: vehicle.phone_number,
            customer_name: vehicle.customer_name,
            plate_number: vehicle.plate_number,
            services: vehicle.services,
            packages: vehicle.packages,
            total_amount: vehicle.total_amount.unwrap_or(0.0),
            completion_time: Local::now().format(COMPLETION_TIME_FORMAT).to_string(),
        };
        self.send_completion_notification(notification).await
    }
}
