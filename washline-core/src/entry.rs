//! Whole-form check for car and motorcycle intake.

use std::collections::HashSet;

use serde::Deserialize;

use crate::model::{ValidationResult, VehicleKind};
use crate::sanitize::sanitize_input;
use crate::validation::{
    CostInput, normalize_plate, validate_car_model, validate_car_plate, validate_car_size,
    validate_cost, validate_crew_availability, validate_crew_for_status,
    validate_motorcycle_model, validate_motorcycle_plate, validate_motorcycle_size,
    validate_phone_number, validate_status, validate_uuid,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Intake or update form for a queued vehicle, as submitted.
pub struct VehicleEntry {
    /// Car or motorcycle.
    pub kind: VehicleKind,
    /// Plate as typed.
    pub plate_number: String,
    /// Make and model.
    pub model: String,
    /// Size slug for the vehicle kind.
    pub size: String,
    /// Optional contact number.
    #[serde(default)]
    pub phone_number: String,
    /// Customer name, free text.
    #[serde(default)]
    pub customer_name: String,
    /// Status slug.
    pub status: String,
    /// Assigned crew member ids.
    #[serde(default)]
    pub crew: Vec<String>,
    /// Selected package id.
    #[serde(default)]
    pub package_id: Option<String>,
    /// Custom cost, when entered.
    #[serde(default)]
    pub cost: Option<CostInput>,
}

/// Sanitize the free-text fields of `entry`, then run every field and
/// cross-field check in form order.
///
/// # Errors
///
/// Returns the first failing [`ValidationResult`].
pub fn validate_vehicle_entry(
    mut entry: VehicleEntry,
    busy_crew: &HashSet<String>,
) -> Result<VehicleEntry, ValidationResult> {
    entry.customer_name = sanitize_input(&entry.customer_name);

    let (plate, model, size) = match entry.kind {
        VehicleKind::Car => (
            validate_car_plate(&entry.plate_number),
            validate_car_model(&entry.model),
            validate_car_size(&entry.size),
        ),
        VehicleKind::Motorcycle => (
            validate_motorcycle_plate(&entry.plate_number),
            validate_motorcycle_model(&entry.model),
            validate_motorcycle_size(&entry.size),
        ),
    };

    let has_package = entry.package_id.is_some();
    let checks = [
        plate,
        model,
        size,
        validate_phone_number(&entry.phone_number),
        validate_status(&entry.status),
        entry
            .package_id
            .as_deref()
            .map_or_else(ValidationResult::valid, validate_uuid),
        entry
            .cost
            .clone()
            .map_or_else(ValidationResult::valid, validate_cost),
        validate_crew_for_status(&entry.status, &entry.crew, has_package),
        validate_crew_availability(&entry.crew, busy_crew),
    ];

    if let Some(failure) = checks.into_iter().find(|result| !result.is_valid()) {
        return Err(failure);
    }

    entry.plate_number = normalize_plate(&entry.plate_number);
    entry.model = entry.model.trim().to_owned();
    entry.phone_number.retain(|ch| !ch.is_whitespace());
    Ok(entry)
}
