//! Core types, validators, and notification wiring for the washline service tracker.

/// Intake form checks that combine the sanitizer and the validators.
pub mod entry;
/// Domain models shared by the validators, the dispatcher, and the relay.
pub mod model;
/// Philippine mobile number normalization for SMS delivery.
pub mod phone;
/// Traits describing the relay and gateway interfaces.
pub mod ports;
/// Fixed-window attempt counter.
pub mod rate_limit;
/// Free-text cleanup applied before validation.
pub mod sanitize;
/// Notification dispatcher used by clients.
pub mod service;
/// Field and cross-field validators.
pub mod validation;

pub use entry::*;
pub use model::*;
pub use ports::*;
pub use rate_limit::*;
pub use sanitize::*;
pub use service::*;
pub use validation::*;
