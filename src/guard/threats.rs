//! Behavioral and content threat detection.
//!
//! # Checks
//! - Honeypot: any value in a decoy field means automation; wins over every other check
//! - Timing: fill time outside `[min_fill_ms, max_fill_ms]`
//! - Spam terms: case-insensitive substrings of the message body
//! - Injection: markup/script patterns in name, email and message
//!
//! # Design Decisions
//! - Honeypot and timing hits surface as `Suspicious`, not as field errors, so a
//!   scripted client learns nothing about which check fired
//! - Injection hits report a generic message; the matched pattern is only logged

use std::sync::LazyLock;

use regex::RegexSet;

use crate::config::{ThreatConfig, TimingConfig};
use crate::guard::decision::{GuardDecision, SuspicionReason, ValidationResult};
use crate::guard::form::{ContactForm, Field, FormCapture};

pub const INVALID_CHARACTERS: &str = "Field contains invalid characters";

const INJECTION_PATTERNS: &[&str] = &[
    r"(?i)<\s*/?\s*script\b",
    r#"(?i)(?:^|[\s"'/<;])on[a-z]{3,}\s*="#,
    r"(?i)javascript\s*:",
    r"(?i)vbscript\s*:",
    r"(?i)\bdata\s*:\s*[a-z]+/[a-z0-9.+-]+",
    r"(?i)<\s*/?\s*(?:iframe|object|embed|form|meta)\b",
    r"(?i)expression\s*\(",
];

static INJECTION_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(INJECTION_PATTERNS).expect("injection patterns are valid"));

/// Fields screened for markup.
const SCREENED_FIELDS: [Field; 3] = [Field::Name, Field::Email, Field::Message];

/// Everything the detector found for one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatReport {
    pub honeypot_tripped: bool,
    pub timing: Option<SuspicionReason>,
    /// Matched denylist terms, in denylist order.
    pub spam_terms: Vec<String>,
    /// Fields in which an injection pattern matched.
    pub injection_fields: Vec<Field>,
}

impl ThreatReport {
    pub fn timing_suspicious(&self) -> bool {
        self.timing.is_some()
    }

    pub fn injection_suspected(&self) -> bool {
        !self.injection_fields.is_empty()
    }

    /// The automation signal, if any. Honeypot wins over timing.
    pub fn suspicion(&self) -> Option<SuspicionReason> {
        if self.honeypot_tripped {
            Some(SuspicionReason::HoneypotFilled)
        } else {
            self.timing
        }
    }

    pub fn blocking(&self) -> bool {
        self.suspicion().is_some() || !self.spam_terms.is_empty() || self.injection_suspected()
    }

    /// Fold content findings into the field errors.
    ///
    /// Spam and injection messages replace any structural message for the same field.
    pub fn merge_into(&self, result: &mut ValidationResult) {
        if !self.spam_terms.is_empty() {
            result.field_errors.set(
                Field::Message,
                format!("Message contains blocked terms: {}", self.spam_terms.join(", ")),
            );
        }
        for field in &self.injection_fields {
            result.field_errors.set(*field, INVALID_CHARACTERS);
        }
    }

    /// Combine with a structural result into the pipeline decision.
    pub fn decide(&self, mut result: ValidationResult) -> GuardDecision {
        if let Some(reason) = self.suspicion() {
            return GuardDecision::Suspicious { reason };
        }
        self.merge_into(&mut result);
        if result.blocking() {
            GuardDecision::Rejected {
                field_errors: result.field_errors,
            }
        } else {
            GuardDecision::Allowed
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThreatDetector {
    spam_terms: Vec<String>,
    min_fill_ms: u64,
    max_fill_ms: u64,
}

impl ThreatDetector {
    pub fn new(threats: &ThreatConfig, timing: &TimingConfig) -> Self {
        Self {
            spam_terms: threats.spam_terms.iter().map(|t| t.to_lowercase()).collect(),
            min_fill_ms: timing.min_fill_ms,
            max_fill_ms: timing.max_fill_ms,
        }
    }

    /// Run every check against a capture.
    pub fn detect(&self, capture: &FormCapture) -> ThreatReport {
        let honeypot_tripped = self.honeypot_tripped(&capture.form);
        if honeypot_tripped {
            tracing::debug!("Honeypot field filled");
            return ThreatReport {
                honeypot_tripped,
                ..Default::default()
            };
        }

        let mut report = self.scan_content(&capture.form);
        report.timing = self.check_timing(capture.elapsed_ms);
        report
    }

    /// Spam and injection checks only; what the relay can verify on its own.
    pub fn scan_content(&self, form: &ContactForm) -> ThreatReport {
        ThreatReport {
            spam_terms: self.spam_terms(&form.message),
            injection_fields: SCREENED_FIELDS
                .into_iter()
                .filter(|field| {
                    let value = match field {
                        Field::Name => &form.name,
                        Field::Email => &form.email,
                        _ => &form.message,
                    };
                    self.injection_in(*field, value)
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn honeypot_tripped(&self, form: &ContactForm) -> bool {
        form.decoys()
            .into_iter()
            .flatten()
            .any(|value| !value.is_empty())
    }

    pub fn check_timing(&self, elapsed_ms: u64) -> Option<SuspicionReason> {
        if elapsed_ms < self.min_fill_ms {
            Some(SuspicionReason::FilledTooFast)
        } else if elapsed_ms > self.max_fill_ms {
            Some(SuspicionReason::FilledTooSlowly)
        } else {
            None
        }
    }

    pub fn spam_terms(&self, message: &str) -> Vec<String> {
        let message = message.to_lowercase();
        self.spam_terms
            .iter()
            .filter(|term| message.contains(term.as_str()))
            .cloned()
            .collect()
    }

    fn injection_in(&self, field: Field, value: &str) -> bool {
        let matches = INJECTION_SET.matches(value);
        if let Some(index) = matches.iter().next() {
            tracing::debug!(field = %field, pattern = INJECTION_PATTERNS[index], "Markup pattern matched");
            true
        } else {
            false
        }
    }
}

/// True when any markup/script pattern matches `text`.
pub fn contains_injection(text: &str) -> bool {
    INJECTION_SET.is_match(text)
}
