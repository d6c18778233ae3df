//! Relay failure taxonomy.
//!
//! Each variant maps to one HTTP status and one client-facing string in
//! `http::response`. Detail carried by a variant is for the operator log only.

use thiserror::Error;

use crate::guard::decision::FieldErrors;
use crate::relay::secrets::SecretsError;
use crate::relay::transport::DeliveryError;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Submitted fields failed server-side rules.
    #[error("validation failed: {}", .0.joined())]
    Validation(FieldErrors),

    /// Body was not a JSON contact form.
    #[error("malformed request body: {0}")]
    BadRequest(String),

    /// Credentials absent at startup.
    #[error("relay not configured: {0}")]
    Configuration(#[from] SecretsError),

    /// Messaging API refused or could not be reached.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl RelayError {
    /// Label for the `relay_requests_total` counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "invalid",
            RelayError::BadRequest(_) => "bad_request",
            RelayError::Configuration(_) => "misconfigured",
            RelayError::Delivery(_) => "delivery_failed",
            RelayError::MethodNotAllowed => "method_not_allowed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::form::Field;

    #[test]
    fn test_validation_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.set(Field::Name, "Name is required");
        errors.set(Field::Email, "Email is required");
        let err = RelayError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "validation failed: Name is required, Email is required"
        );
        assert_eq!(err.outcome(), "invalid");
    }

    #[test]
    fn test_from_conversions() {
        let err: RelayError = SecretsError::Missing("X").into();
        assert!(matches!(err, RelayError::Configuration(_)));
        let err: RelayError = DeliveryError::Timeout.into();
        assert_eq!(err.outcome(), "delivery_failed");
    }
}
