//! Abuse and conversion analytics for the guard.
//!
//! The sink is chosen once, when the orchestrator is built. Embedders without an
//! analytics backend pass [`NoopAnalytics`].

use crate::guard::form::ServiceKind;
use crate::observability::metrics;

/// Something worth counting about a submit interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    RateLimited,
    HoneypotTripped,
    TimingFailed,
    SpamDetected,
    InjectionDetected,
    ValidationFailed,
    SubmissionSucceeded { service: ServiceKind, has_phone: bool },
    RelayRejected,
    SubmissionError,
}

impl GuardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GuardEvent::RateLimited => "form_rate_limited",
            GuardEvent::HoneypotTripped => "form_honeypot_tripped",
            GuardEvent::TimingFailed => "form_time_validation_failed",
            GuardEvent::SpamDetected => "form_spam_detected",
            GuardEvent::InjectionDetected => "form_injection_detected",
            GuardEvent::ValidationFailed => "form_validation_failed",
            GuardEvent::SubmissionSucceeded { .. } => "form_submission_success",
            GuardEvent::RelayRejected => "form_relay_error",
            GuardEvent::SubmissionError => "form_submission_error",
        }
    }

    /// Automation signals, as opposed to user mistakes.
    pub fn is_abuse_signal(&self) -> bool {
        matches!(self, GuardEvent::HoneypotTripped | GuardEvent::TimingFailed)
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: GuardEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track(&self, _event: GuardEvent) {}
}

/// Emits events as structured log lines and metric counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, event: GuardEvent) {
        match &event {
            GuardEvent::SubmissionSucceeded { service, has_phone } => {
                tracing::info!(event = event.name(), service = %service, has_phone, "Guard event");
            }
            _ if event.is_abuse_signal() => {
                tracing::warn!(event = event.name(), "Suspected automated submission");
            }
            _ => {
                tracing::info!(event = event.name(), "Guard event");
            }
        }
        metrics::record_guard_event(event.name());
    }
}
