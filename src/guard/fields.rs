//! Structural field validation.
//!
//! Each rule is independent; every violation is collected so the form can show
//! all problems at once.
//!
//! | field   | rule                                                         |
//! |---------|--------------------------------------------------------------|
//! | name    | required, trimmed length 2..=50                              |
//! | email   | required, `local@domain.tld` shape, at most 100 characters   |
//! | phone   | optional, `+` and 6..=15 digits once separators are stripped |
//! | service | required, one of [`ServiceKind`]                             |
//! | message | required, trimmed length 10..=1000                           |

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::guard::decision::{FieldErrors, ValidationResult};
use crate::guard::form::{ContactForm, Field, ServiceKind, SubmissionPayload};

pub const NAME_LEN: RangeInclusive<usize> = 2..=50;
pub const EMAIL_MAX_LEN: usize = 100;
pub const MESSAGE_LEN: RangeInclusive<usize> = 10..=1000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{6,15}$").expect("phone pattern is valid"));

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Strip the separators people type inside phone numbers.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator;

impl FieldValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run every field rule.
    pub fn validate(&self, form: &ContactForm) -> ValidationResult {
        let mut errors = FieldErrors::new();

        let checks = [
            (Field::Name, check_name(&form.name)),
            (Field::Email, check_email(&form.email)),
            (Field::Phone, form.phone_value().and_then(check_phone)),
            (Field::Service, check_service(&form.service)),
            (Field::Message, check_message(&form.message)),
        ];
        for (field, error) in checks {
            if let Some(message) = error {
                errors.set(field, message);
            }
        }

        ValidationResult::new(errors)
    }

    /// Validate and, on success, produce the typed payload.
    pub fn accept(&self, form: &ContactForm) -> Result<SubmissionPayload, FieldErrors> {
        let result = self.validate(form);
        if result.blocking() {
            return Err(result.field_errors);
        }

        let service = form
            .service
            .trim()
            .parse::<ServiceKind>()
            .map_err(|_| service_errors())?;

        Ok(SubmissionPayload {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone_value().map(normalize_phone),
            service,
            message: form.message.trim().to_string(),
        })
    }
}

fn service_errors() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.set(Field::Service, "Unknown service selected");
    errors
}

fn check_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return Some("Name is required".into());
    }
    if !NAME_LEN.contains(&char_len(name)) {
        return Some(format!(
            "Name must be between {} and {} characters",
            NAME_LEN.start(),
            NAME_LEN.end()
        ));
    }
    None
}

fn check_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Email is required".into());
    }
    if char_len(email) > EMAIL_MAX_LEN {
        return Some(format!("Email must be at most {EMAIL_MAX_LEN} characters"));
    }
    if !EMAIL_RE.is_match(email) {
        return Some("Email address is invalid".into());
    }
    None
}

fn check_phone(phone: &str) -> Option<String> {
    if PHONE_RE.is_match(&normalize_phone(phone)) {
        None
    } else {
        Some("Phone number is invalid".into())
    }
}

fn check_service(service: &str) -> Option<String> {
    let service = service.trim();
    if service.is_empty() {
        return Some("Service is required".into());
    }
    if service.parse::<ServiceKind>().is_err() {
        return Some("Unknown service selected".into());
    }
    None
}

fn check_message(message: &str) -> Option<String> {
    let message = message.trim();
    if message.is_empty() {
        return Some("Message is required".into());
    }
    if !MESSAGE_LEN.contains(&char_len(message)) {
        return Some(format!(
            "Message must be between {} and {} characters",
            MESSAGE_LEN.start(),
            MESSAGE_LEN.end()
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Jo".into(),
            email: "a@b.co".into(),
            service: "landing".into(),
            message: "0123456789".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_valid_form_has_no_errors() {
        let result = FieldValidator::new().validate(&valid_form());
        assert!(result.field_errors.is_empty());
        assert!(!result.blocking());
    }

    #[test]
    fn test_every_required_field_reported_in_order() {
        let form = ContactForm {
            name: "J".into(),
            ..Default::default()
        };
        let result = FieldValidator::new().validate(&form);

        assert!(result.blocking());
        let fields: Vec<Field> = result.field_errors.fields().collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Service, Field::Message]);
        assert_eq!(
            result.field_errors.get(Field::Name),
            Some("Name must be between 2 and 50 characters")
        );
        assert_eq!(result.field_errors.get(Field::Email), Some("Email is required"));
    }

    #[test]
    fn test_length_bounds_use_trimmed_text() {
        let mut form = valid_form();
        form.name = "  J  ".into();
        form.message = format!("   {}   ", "x".repeat(9));
        let errors = FieldValidator::new().validate(&form).field_errors;
        assert!(errors.contains(Field::Name));
        assert!(errors.contains(Field::Message));

        form.name = "N".repeat(50);
        form.message = "m".repeat(1000);
        assert!(FieldValidator::new().validate(&form).field_errors.is_empty());

        form.message = "m".repeat(1001);
        assert!(FieldValidator::new().validate(&form).field_errors.contains(Field::Message));
    }

    #[test]
    fn test_email_shape_and_length() {
        let validator = FieldValidator::new();
        for bad in ["plain", "a@b", "a b@c.de", "@b.co", "a@@b.co"] {
            let mut form = valid_form();
            form.email = bad.into();
            assert_eq!(
                validator.validate(&form).field_errors.get(Field::Email),
                Some("Email address is invalid"),
                "{bad}"
            );
        }

        let mut form = valid_form();
        form.email = format!("{}@example.com", "a".repeat(90));
        assert!(validator.validate(&form).field_errors.contains(Field::Email));
    }

    #[test]
    fn test_phone_optional_with_separators() {
        let validator = FieldValidator::new();
        let mut form = valid_form();

        form.phone = Some("+7 (912) 345-67-89".into());
        assert!(validator.validate(&form).field_errors.is_empty());

        form.phone = Some("".into());
        assert!(validator.validate(&form).field_errors.is_empty());

        for bad in ["12345", "+1234567890123456", "call me", "++123456"] {
            form.phone = Some(bad.into());
            assert!(validator.validate(&form).field_errors.contains(Field::Phone), "{bad}");
        }
    }

    #[test]
    fn test_unknown_service_rejected() {
        let mut form = valid_form();
        form.service = "consulting".into();
        assert_eq!(
            FieldValidator::new().validate(&form).field_errors.get(Field::Service),
            Some("Unknown service selected")
        );
    }

    #[test]
    fn test_accept_produces_trimmed_typed_payload() {
        let mut form = valid_form();
        form.name = "  Jo ".into();
        form.phone = Some(" +123456 ".into());

        let payload = FieldValidator::new().accept(&form).unwrap();
        assert_eq!(payload.name(), "Jo");
        assert_eq!(payload.phone(), Some("+123456"));
        assert_eq!(payload.service(), ServiceKind::Landing);

        form.phone = Some("+7 (912) 345-67-89".into());
        let payload = FieldValidator::new().accept(&form).unwrap();
        assert_eq!(payload.phone(), Some("+79123456789"));

        form.email.clear();
        assert!(FieldValidator::new().accept(&form).is_err());
    }
}
