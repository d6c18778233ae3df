//! Validation results and pipeline decisions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::guard::form::Field;

/// Per-field error messages, iterated in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, replacing any earlier message for the same field.
    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// All messages joined for a single-line error string.
    pub fn joined(&self) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Outcome of structural validation, possibly merged with threat findings.
///
/// Every detected issue blocks; there are no advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub field_errors: FieldErrors,
}

impl ValidationResult {
    pub fn new(field_errors: FieldErrors) -> Self {
        Self { field_errors }
    }

    pub fn blocking(&self) -> bool {
        !self.field_errors.is_empty()
    }
}

/// Why a submission looks automated. Never shown verbatim to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionReason {
    HoneypotFilled,
    FilledTooFast,
    FilledTooSlowly,
}

impl SuspicionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuspicionReason::HoneypotFilled => "honeypot_filled",
            SuspicionReason::FilledTooFast => "filled_too_fast",
            SuspicionReason::FilledTooSlowly => "filled_too_slowly",
        }
    }
}

impl fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision of the guard pipeline for one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    RateLimited { retry_after_ms: u64 },
    Rejected { field_errors: FieldErrors },
    Suspicious { reason: SuspicionReason },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            GuardDecision::Allowed => "allowed",
            GuardDecision::RateLimited { .. } => "rate_limited",
            GuardDecision::Rejected { .. } => "rejected",
            GuardDecision::Suspicious { .. } => "suspicious",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_iterate_in_declaration_order() {
        let mut errors = FieldErrors::new();
        errors.set(Field::Message, "m");
        errors.set(Field::Name, "n");
        errors.set(Field::Service, "s");

        let order: Vec<Field> = errors.fields().collect();
        assert_eq!(order, vec![Field::Name, Field::Service, Field::Message]);
        assert_eq!(errors.joined(), "n, s, m");
    }

    #[test]
    fn test_later_message_replaces_earlier() {
        let mut errors = FieldErrors::new();
        errors.set(Field::Message, "too short");
        errors.set(Field::Message, "blocked");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Message), Some("blocked"));
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.set(Field::Email, "bad");
        let json = serde_json::to_string(&ValidationResult::new(errors)).unwrap();
        assert_eq!(json, r#"{"field_errors":{"email":"bad"}}"#);
    }
}
