//! Notification text for the messaging channel.

use chrono::{DateTime, Utc};

use crate::guard::form::SubmissionPayload;
use crate::guard::sanitize::sanitize;

const UNKNOWN: &str = "Unknown";

/// Facts the relay observed itself, as opposed to what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub observed_at: DateTime<Utc>,
    pub origin: Option<String>,
    pub client_ip: Option<String>,
}

impl RequestContext {
    pub fn now(origin: Option<String>, client_ip: Option<String>) -> Self {
        Self {
            observed_at: Utc::now(),
            origin,
            client_ip,
        }
    }
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub markup_mode: String,
}

#[derive(Debug, Clone)]
pub struct MessageFormatter {
    markup_mode: String,
}

impl MessageFormatter {
    pub fn new(markup_mode: impl Into<String>) -> Self {
        Self {
            markup_mode: markup_mode.into(),
        }
    }

    pub fn format(&self, payload: &SubmissionPayload, context: &RequestContext) -> OutboundMessage {
        let mut lines = vec![
            "<b>New contact request</b>".to_string(),
            String::new(),
            format!("<b>Name:</b> {}", sanitize(payload.name())),
            format!("<b>Email:</b> {}", sanitize(payload.email())),
        ];
        if let Some(phone) = payload.phone() {
            lines.push(format!("<b>Phone:</b> {}", sanitize(phone)));
        }
        lines.push(format!("<b>Service:</b> {}", payload.service().label()));
        lines.push("<b>Message:</b>".to_string());
        lines.push(sanitize(payload.message()));
        lines.push(String::new());
        lines.push(format!(
            "<b>Date:</b> {}",
            context.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(format!("<b>Origin:</b> {}", observed(&context.origin)));
        lines.push(format!("<b>IP:</b> {}", observed(&context.client_ip)));

        OutboundMessage {
            text: lines.join("\n"),
            markup_mode: self.markup_mode.clone(),
        }
    }
}

fn observed(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(sanitize)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
