//! Field validators for intake and status forms.
//!
//! Every public validator returns a [`ValidationResult`]; the first failing
//! check decides the message. Failures are plain values and are never raised.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::model::{CarSize, MotorcycleSize, ServiceStatus, ValidationResult};

/// Shortest accepted plate, separator included.
pub const PLATE_MIN_LEN: usize = 3;
/// Longest accepted plate, separator included.
pub const PLATE_MAX_LEN: usize = 8;
/// Shortest accepted model name.
pub const MODEL_MIN_LEN: usize = 2;
/// Longest accepted model name.
pub const MODEL_MAX_LEN: usize = 100;
/// Sanity ceiling for a single cost entry.
pub const MAX_COST: f64 = 100_000.0;

static LOCAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(09|\+639)[0-9]{9}$").expect("phone pattern compiles"));

static UNSAFE_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script|javascript:|on\w+\s*=|data:text/html")
        .expect("model denylist compiles")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid pattern compiles")
});

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a field can be rejected. The message is shown to the user as is.
pub enum ValidationError {
    /// Plate missing or blank.
    #[error("Plate number is required")]
    PlateRequired,
    /// Plate too short or too long.
    #[error("Plate number must be between 3 and 8 characters")]
    PlateLength,
    /// Plate without exactly one dash between two non-empty parts.
    #[error("Plate number must contain a single dash between letters and numbers (e.g. ABC-1234)")]
    PlateFormat,
    /// Phone not in a local mobile format.
    #[error("Phone number must be in the format 09XXXXXXXXX or +639XXXXXXXXX")]
    PhoneFormat,
    /// Model missing or blank.
    #[error("Model is required")]
    ModelRequired,
    /// Model too short or too long.
    #[error("Model must be between 2 and 100 characters")]
    ModelLength,
    /// Model carries markup or script fragments.
    #[error("Model contains invalid characters")]
    ModelUnsafe,
    /// Cost does not parse to a finite number.
    #[error("Cost must be a valid number")]
    CostNotNumber,
    /// Cost below zero.
    #[error("Cost cannot be negative")]
    CostNegative,
    /// Cost above the sanity ceiling.
    #[error("Cost cannot exceed 100,000")]
    CostTooLarge,
    /// Unknown car size.
    #[error("Invalid car size. Must be one of: small, medium, large, extra_large")]
    InvalidCarSize,
    /// Unknown motorcycle size.
    #[error("Invalid motorcycle size. Must be one of: small, large")]
    InvalidMotorcycleSize,
    /// Unknown service status.
    #[error(
        "Invalid status. Must be one of: waiting, in-progress, payment-pending, completed, cancelled"
    )]
    InvalidStatus,
    /// Identifier is not a UUID.
    #[error("Invalid ID format")]
    InvalidUuid,
    /// In-progress service without crew or package.
    #[error(
        "At least one crew member must be assigned while the service is in progress, unless a package is selected"
    )]
    CrewRequired,
    /// A selected crew member is on another job.
    #[error("One or more selected crew members are currently busy with another service")]
    CrewBusy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
/// Cost as it arrives from a form: either a number or its text.
pub enum CostInput {
    /// Already numeric.
    Number(f64),
    /// Text typed into a field.
    Text(String),
}

impl From<f64> for CostInput {
    fn from(value: f64) -> Self {
        CostInput::Number(value)
    }
}

impl From<&str> for CostInput {
    fn from(value: &str) -> Self {
        CostInput::Text(value.to_owned())
    }
}

impl From<String> for CostInput {
    fn from(value: String) -> Self {
        CostInput::Text(value)
    }
}

impl CostInput {
    fn parse(&self) -> Option<f64> {
        let value = match self {
            CostInput::Number(number) => *number,
            CostInput::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Trim and uppercase a plate the way it is stored.
#[must_use]
pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn check_plate(raw: &str) -> Result<(), ValidationError> {
    let plate = normalize_plate(raw);
    if plate.is_empty() {
        return Err(ValidationError::PlateRequired);
    }

    let len = plate.chars().count();
    if !(PLATE_MIN_LEN..=PLATE_MAX_LEN).contains(&len) {
        return Err(ValidationError::PlateLength);
    }

    match plate.split_once('-') {
        Some((prefix, suffix))
            if !prefix.is_empty() && !suffix.is_empty() && !suffix.contains('-') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::PlateFormat),
    }
}

/// Validate a car plate.
#[must_use]
pub fn validate_car_plate(raw: &str) -> ValidationResult {
    check_plate(raw).into()
}

/// Validate a motorcycle plate. Same rule as cars.
#[must_use]
pub fn validate_motorcycle_plate(raw: &str) -> ValidationResult {
    check_plate(raw).into()
}

/// Validate an optional contact number.
///
/// Blank input passes. Whitespace anywhere is ignored.
#[must_use]
pub fn validate_phone_number(raw: &str) -> ValidationResult {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() || LOCAL_PHONE.is_match(&compact) {
        ValidationResult::valid()
    } else {
        ValidationError::PhoneFormat.into()
    }
}

fn check_model(raw: &str) -> Result<(), ValidationError> {
    let model = raw.trim();
    if model.is_empty() {
        return Err(ValidationError::ModelRequired);
    }
    let len = model.chars().count();
    if !(MODEL_MIN_LEN..=MODEL_MAX_LEN).contains(&len) {
        return Err(ValidationError::ModelLength);
    }
    if UNSAFE_MODEL.is_match(model) {
        return Err(ValidationError::ModelUnsafe);
    }
    Ok(())
}

/// Validate a car model name.
#[must_use]
pub fn validate_car_model(raw: &str) -> ValidationResult {
    check_model(raw).into()
}

/// Validate a motorcycle model name.
#[must_use]
pub fn validate_motorcycle_model(raw: &str) -> ValidationResult {
    check_model(raw).into()
}

fn check_cost(input: &CostInput) -> Result<(), ValidationError> {
    let cost = input.parse().ok_or(ValidationError::CostNotNumber)?;
    if cost < 0.0 {
        return Err(ValidationError::CostNegative);
    }
    if cost > MAX_COST {
        return Err(ValidationError::CostTooLarge);
    }
    Ok(())
}

/// Validate a cost given as a number or numeric text.
#[must_use]
pub fn validate_cost(input: impl Into<CostInput>) -> ValidationResult {
    check_cost(&input.into()).into()
}

/// Validate a car size slug.
#[must_use]
pub fn validate_car_size(raw: &str) -> ValidationResult {
    raw.parse::<CarSize>().map(drop).into()
}

/// Validate a motorcycle size slug.
#[must_use]
pub fn validate_motorcycle_size(raw: &str) -> ValidationResult {
    raw.parse::<MotorcycleSize>().map(drop).into()
}

/// Validate a service status slug.
#[must_use]
pub fn validate_status(raw: &str) -> ValidationResult {
    raw.parse::<ServiceStatus>().map(drop).into()
}

/// Validate a record identifier as an RFC 4122 (v1 to v5) UUID.
#[must_use]
pub fn validate_uuid(raw: &str) -> ValidationResult {
    if UUID.is_match(raw) {
        ValidationResult::valid()
    } else {
        ValidationError::InvalidUuid.into()
    }
}

/// Whether the crew picker should be active for this status.
#[must_use]
pub fn is_crew_selection_enabled(status: &str) -> bool {
    status.parse::<ServiceStatus>() == Ok(ServiceStatus::InProgress)
}

/// Whether at least one crew member must be picked.
///
/// The crew validator below goes through this predicate; keep the rule here.
#[must_use]
pub fn is_crew_required(status: &str, has_package: bool) -> bool {
    is_crew_selection_enabled(status) && !has_package
}

/// Validate the crew list against the status and package selection.
#[must_use]
pub fn validate_crew_for_status<S: AsRef<str>>(
    status: &str,
    crew: &[S],
    has_package: bool,
) -> ValidationResult {
    if is_crew_required(status, has_package) && crew.is_empty() {
        return ValidationError::CrewRequired.into();
    }
    ValidationResult::valid()
}

/// Reject a crew selection that overlaps members already on another job.
#[must_use]
pub fn validate_crew_availability<S: AsRef<str>>(
    selected: &[S],
    busy: &HashSet<String>,
) -> ValidationResult {
    if selected.iter().any(|member| busy.contains(member.as_ref())) {
        return ValidationError::CrewBusy.into();
    }
    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CREW: [&str; 0] = [];

    #[test]
    fn plate_accepts_dashed_and_normalizes_case() {
        assert!(validate_car_plate("abc-123").is_valid());
        assert!(validate_motorcycle_plate("  12-AB  ").is_valid());
        assert!(validate_car_plate("A-1").is_valid());
        assert!(validate_car_plate("ABCD-123").is_valid());
    }

    #[test]
    fn plate_rejects_bad_shapes_with_first_failure() {
        assert_eq!(
            validate_car_plate("   ").error(),
            Some("Plate number is required")
        );
        assert_eq!(
            validate_car_plate("A-").error(),
            Some("Plate number must be between 3 and 8 characters")
        );
        assert_eq!(
            validate_car_plate("ABCDE-1234").error(),
            Some("Plate number must be between 3 and 8 characters")
        );
        for bad in ["ABC123", "-ABC12", "ABC12-", "AB-C-12", "A--1"] {
            let result = validate_motorcycle_plate(bad);
            assert!(!result.is_valid(), "{bad} should be rejected");
            assert_eq!(
                result.error(),
                Some(ValidationError::PlateFormat.to_string().as_str())
            );
        }
    }

    #[test]
    fn phone_accepts_blank_and_local_formats() {
        for ok in [
            "",
            "   ",
            "09171234567",
            "+639171234567",
            "0917 123 4567",
            "+63 917 123 4567",
        ] {
            assert!(validate_phone_number(ok).is_valid(), "{ok} should pass");
        }
    }

    #[test]
    fn phone_rejects_everything_else() {
        for bad in [
            "0917123456",
            "091712345678",
            "639171234567",
            "+63917123456a",
            "08171234567",
            "(0917)1234567",
        ] {
            let result = validate_phone_number(bad);
            assert!(!result.is_valid(), "{bad} should fail");
            assert!(result.error().is_some());
        }
    }

    #[test]
    fn model_checks_length_and_denylist() {
        assert!(validate_car_model("Toyota Vios").is_valid());
        assert!(validate_motorcycle_model("  Honda Click 125i ").is_valid());
        assert_eq!(validate_car_model("").error(), Some("Model is required"));
        assert_eq!(
            validate_car_model("X").error(),
            Some("Model must be between 2 and 100 characters")
        );
        assert!(!validate_car_model(&"a".repeat(101)).is_valid());
        for bad in [
            "<SCRIPT>alert(1)",
            "JavaScript:void(0)",
            "Vios onClick=steal()",
            "img onerror = x",
            "data:TEXT/html;base64,xx",
        ] {
            assert_eq!(
                validate_motorcycle_model(bad).error(),
                Some("Model contains invalid characters"),
                "{bad}"
            );
        }
    }

    #[test]
    fn cost_bounds() {
        assert!(!validate_cost(-1.0).is_valid());
        assert!(!validate_cost(100_001.0).is_valid());
        assert!(validate_cost(100_000.0).is_valid());
        assert!(validate_cost(0.0).is_valid());

        let parsed = validate_cost("42.5");
        assert!(parsed.is_valid());
        assert_eq!(parsed.error(), None);

        assert_eq!(validate_cost("abc").error(), Some("Cost must be a valid number"));
        assert_eq!(validate_cost("").error(), Some("Cost must be a valid number"));
        assert_eq!(validate_cost("NaN").error(), Some("Cost must be a valid number"));
        assert_eq!(validate_cost(f64::INFINITY).error(), Some("Cost must be a valid number"));
        assert_eq!(validate_cost("-5").error(), Some("Cost cannot be negative"));
    }

    #[test]
    fn sizes_are_distinct_per_vehicle_kind() {
        for size in ["small", "medium", "large", "extra_large"] {
            assert!(validate_car_size(size).is_valid());
        }
        assert!(validate_motorcycle_size("small").is_valid());
        assert!(validate_motorcycle_size("large").is_valid());
        assert!(!validate_motorcycle_size("medium").is_valid());
        assert!(!validate_motorcycle_size("extra_large").is_valid());
        assert!(!validate_car_size("Large").is_valid());
    }

    #[test]
    fn status_accepts_only_lifecycle_values() {
        for status in ServiceStatus::ALL {
            assert!(validate_status(status.as_str()).is_valid());
        }
        assert!(!validate_status("in_progress").is_valid());
        assert!(!validate_status("done").is_valid());
    }

    #[test]
    fn uuid_versions_one_to_five() {
        assert!(validate_uuid("123e4567-e89b-12d3-a456-426614174000").is_valid());
        assert!(validate_uuid("F47AC10B-58CC-4372-A567-0E02B2C3D479").is_valid());
        assert!(!validate_uuid("f47ac10b-58cc-6372-a567-0e02b2c3d479").is_valid());
        assert!(!validate_uuid("f47ac10b-58cc-4372-c567-0e02b2c3d479").is_valid());
        assert!(!validate_uuid("not-a-uuid").is_valid());
    }

    #[test]
    fn crew_for_status_examples() {
        assert!(!validate_crew_for_status("in-progress", &NO_CREW, false).is_valid());
        assert!(validate_crew_for_status("in-progress", &NO_CREW, true).is_valid());
        assert!(validate_crew_for_status("waiting", &NO_CREW, false).is_valid());
        assert!(validate_crew_for_status("in-progress", &["crew-1"], false).is_valid());
    }

    #[test]
    fn crew_predicates_agree_with_validator() {
        for status in ServiceStatus::ALL {
            for has_package in [false, true] {
                let slug = status.as_str();
                let required = is_crew_required(slug, has_package);
                let rejected_empty =
                    !validate_crew_for_status(slug, &NO_CREW, has_package).is_valid();

                assert_eq!(required, rejected_empty, "{slug} package={has_package}");
                assert_eq!(
                    required,
                    is_crew_selection_enabled(slug) && !has_package,
                    "{slug} package={has_package}"
                );
                assert_eq!(
                    is_crew_selection_enabled(slug),
                    status == ServiceStatus::InProgress
                );
            }
        }
    }

    #[test]
    fn crew_availability_rejects_overlap() {
        let busy: HashSet<String> = ["c2".to_owned()].into_iter().collect();
        assert!(validate_crew_availability(&["c1", "c3"], &busy).is_valid());
        assert!(validate_crew_availability(&NO_CREW, &busy).is_valid());

        let overlap = validate_crew_availability(&["c1", "c2"], &busy);
        assert!(!overlap.is_valid());
        assert!(!overlap.error().unwrap_or_default().contains("c2"));
    }
}
