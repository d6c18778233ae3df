//! Server-side re-validation of relay requests.
//!
//! The client half can be skipped entirely, so the relay runs the same field
//! rules and the content scans it can perform without client context (spam
//! terms and injection patterns; honeypot and timing need the browser).
//! The client escapes each free-text field once before sending. The relay
//! decodes exactly one level and applies the rules to the result, which is the
//! text the visitor typed, so both halves judge the same input.

use crate::config::{ThreatConfig, TimingConfig};
use crate::guard::decision::FieldErrors;
use crate::guard::fields::FieldValidator;
use crate::guard::form::{ContactForm, SubmissionPayload};
use crate::guard::sanitize::unescape;
use crate::guard::threats::ThreatDetector;

#[derive(Debug, Clone)]
pub struct RelayValidator {
    fields: FieldValidator,
    threats: ThreatDetector,
}

impl RelayValidator {
    pub fn new(threats: &ThreatConfig) -> Self {
        Self {
            fields: FieldValidator::new(),
            threats: ThreatDetector::new(threats, &TimingConfig::default()),
        }
    }

    /// Accept a relay request body or report every problem found.
    pub fn check(&self, form: &ContactForm) -> Result<SubmissionPayload, FieldErrors> {
        let decoded = decode(form);

        let mut result = self.fields.validate(&decoded);
        self.threats.scan_content(&decoded).merge_into(&mut result);
        if result.blocking() {
            return Err(result.field_errors);
        }

        self.fields.accept(&decoded)
    }
}

fn decode(form: &ContactForm) -> ContactForm {
    ContactForm {
        name: unescape(&form.name),
        email: unescape(&form.email),
        phone: form.phone.as_deref().map(unescape),
        service: form.service.clone(),
        message: unescape(&form.message),
        honeypot: None,
        email_confirm: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::form::Field;
    use crate::guard::sanitize::sanitize_payload;
    use crate::guard::threats::INVALID_CHARACTERS;

    fn validator() -> RelayValidator {
        RelayValidator::new(&ThreatConfig::default())
    }

    fn form() -> ContactForm {
        ContactForm {
            name: "Anna".into(),
            email: "anna@example.org".into(),
            service: "shop".into(),
            message: "I would like an online store for my bakery.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_accepted() {
        let payload = validator().check(&form()).unwrap();
        assert_eq!(payload.name(), "Anna");
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut form = form();
        form.email.clear();
        let errors = validator().check(&form).unwrap_err();
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
    }

    #[test]
    fn test_escaped_markup_still_detected() {
        let mut form = form();
        form.message = "hello &lt;script&gt;alert(1)&lt;/script&gt; there".into();
        let errors = validator().check(&form).unwrap_err();
        assert_eq!(errors.get(Field::Message), Some(INVALID_CHARACTERS));
    }

    #[test]
    fn test_escaping_does_not_inflate_length() {
        let mut form = form();
        form.message = "&quot;".repeat(1000);
        assert!(validator().check(&form).is_ok());
    }

    #[test]
    fn test_client_accepted_text_is_relay_accepted() {
        let client_side = ThreatDetector::new(&ThreatConfig::default(), &TimingConfig::default());
        let mut typed = form();
        typed.message = "How do I show &lt;script&gt; literally on my page?".into();
        assert!(!client_side.scan_content(&typed).blocking());

        let sent = sanitize_payload(&FieldValidator::new().accept(&typed).unwrap());
        let received = ContactForm {
            name: sent.name().into(),
            email: sent.email().into(),
            phone: sent.phone().map(str::to_string),
            service: sent.service().as_str().into(),
            message: sent.message().into(),
            ..Default::default()
        };

        let payload = validator().check(&received).unwrap();
        assert_eq!(payload.message(), typed.message);
    }

    #[test]
    fn test_spam_rejected_server_side() {
        let mut form = form();
        form.message = "Visit my casino for great bonuses".into();
        let errors = validator().check(&form).unwrap_err();
        assert!(errors.get(Field::Message).unwrap().contains("casino"));
    }
}
