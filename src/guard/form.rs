//! Form capture and the typed submission payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw field values exactly as captured from the contact form.
///
/// Nothing here has been checked; only [`crate::guard::fields::FieldValidator`]
/// turns it into a [`SubmissionPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
    /// Decoy field hidden from humans.
    pub honeypot: Option<String>,
    /// Confirmation decoy that must stay blank.
    pub email_confirm: Option<String>,
}

impl ContactForm {
    /// Trimmed phone value, `None` when absent or blank.
    pub fn phone_value(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// The decoy fields in the order they are inspected.
    pub fn decoys(&self) -> [Option<&str>; 2] {
        [self.honeypot.as_deref(), self.email_confirm.as_deref()]
    }
}

/// A one-shot capture: the form plus how long it took to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormCapture {
    pub form: ContactForm,
    /// Capture time minus form-render time.
    pub elapsed_ms: u64,
}

impl FormCapture {
    pub fn new(form: ContactForm, elapsed_ms: u64) -> Self {
        Self { form, elapsed_ms }
    }
}

/// Form fields in declaration order. Ordering follows declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Service,
    Message,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::Name, Field::Email, Field::Phone, Field::Service, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Service => "service",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of services a visitor can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Landing,
    Corporate,
    Shop,
    Bot,
    Complex,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Landing,
        ServiceKind::Corporate,
        ServiceKind::Shop,
        ServiceKind::Bot,
        ServiceKind::Complex,
    ];

    /// Identifier used on the wire and in the form.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Landing => "landing",
            ServiceKind::Corporate => "corporate",
            ServiceKind::Shop => "shop",
            ServiceKind::Bot => "bot",
            ServiceKind::Complex => "complex",
        }
    }

    /// Human-readable label for notifications.
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::Landing => "Landing page",
            ServiceKind::Corporate => "Corporate website",
            ServiceKind::Shop => "Online store",
            ServiceKind::Bot => "Chat bot",
            ServiceKind::Complex => "Complex solution",
        }
    }
}

impl FromStr for ServiceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission that passed field validation.
///
/// Only constructible inside the crate, by the field validator. This is also
/// the JSON body sent from the client to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub(crate) name: String,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone: Option<String>,
    pub(crate) service: ServiceKind,
    pub(crate) message: String,
}

impl SubmissionPayload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
