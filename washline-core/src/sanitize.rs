//! Best-effort cleanup of free-text form fields.
//!
//! This is a denylist over a few known injection fragments, not an HTML
//! sanitizer. Output is still escaped wherever it is rendered.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("scheme pattern compiles"));

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+=").expect("handler pattern compiles"));

/// Strip angle brackets, `javascript:` and inline `on…=` handlers from text.
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    let without_tags: String = input
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '<' | '>'))
        .collect();
    let without_scheme = SCRIPT_SCHEME.replace_all(&without_tags, "");
    EVENT_HANDLER.replace_all(&without_scheme, "").into_owned()
}

/// Sanitize a raw JSON form value. Anything but a string becomes empty.
#[must_use]
pub fn sanitize_value(value: &Value) -> String {
    value.as_str().map(sanitize_input).unwrap_or_default()
}
