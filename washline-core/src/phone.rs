//! Recipient number handling for SMS delivery.
//!
//! Form input is checked by [`crate::validation::validate_phone_number`]; this
//! module turns an accepted number into the `+63` international form the
//! gateway expects.

use std::sync::LazyLock;

use regex::Regex;

/// Country calling code for the Philippines.
pub const COUNTRY_CODE: &str = "63";

static INTERNATIONAL_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+639[0-9]{9}$").expect("mobile pattern compiles"));

/// Normalize a number to `+63…`.
///
/// Unrecognized digit patterns still get `+63` prepended, so malformed input
/// can produce a malformed result. [`validate_phone_number`] catches those.
#[must_use]
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        11 => {
            if let Some(subscriber) = digits.strip_prefix('0') {
                format!("+{COUNTRY_CODE}{subscriber}")
            } else {
                format!("+{COUNTRY_CODE}{digits}")
            }
        }
        12 if digits.starts_with(COUNTRY_CODE) => format!("+{digits}"),
        _ => format!("+{COUNTRY_CODE}{digits}"),
    }
}

/// Whether `raw` normalizes to a reachable mobile number (`+639` and nine digits).
#[must_use]
pub fn validate_phone_number(raw: &str) -> bool {
    INTERNATIONAL_MOBILE.is_match(&format_phone_number(raw))
}
