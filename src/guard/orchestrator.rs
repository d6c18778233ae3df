//! Submit orchestration.
//!
//! # State Transitions
//! ```text
//! Idle → Checking → RateLimited | Invalid | Suspicious      (terminal, re-armable)
//!                 → Sending → Succeeded | Failed            (terminal, re-armable)
//! ```
//!
//! # Sequence
//! 1. limiter check (denied → RateLimited)
//! 2. capture with fill time, honeypot/timing (→ Suspicious)
//! 3. field rules + spam/injection scan (→ Invalid)
//! 4. sanitize, then count the attempt
//! 5. relay call raced against the submit deadline (→ Succeeded | Failed)
//!
//! An attempt is counted only once it passed validation, whatever the network
//! outcome. Nothing here returns an error: every failure becomes a state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::GuardConfig;
use crate::guard::analytics::{AnalyticsSink, GuardEvent, NoopAnalytics};
use crate::guard::clock::{Clock, SystemClock};
use crate::guard::decision::{FieldErrors, GuardDecision, SuspicionReason};
use crate::guard::fields::FieldValidator;
use crate::guard::form::{ContactForm, FormCapture};
use crate::guard::rate_limit::{RateLimitCheck, RateLimiter};
use crate::guard::sanitize::sanitize_payload;
use crate::guard::store::AttemptStore;
use crate::guard::threats::{ThreatDetector, ThreatReport};
use crate::guard::transport::{RelayClient, TransportError};
use crate::observability::metrics;
use crate::resilience::timeouts::{race_detached, DeadlineError};

pub const SUCCESS_MESSAGE: &str = "Message sent! We will get back to you shortly.";
pub const FAILURE_MESSAGE: &str = "Something went wrong while sending. Please try again.";
pub const INVALID_MESSAGE: &str = "Please correct the highlighted fields.";
pub const SUSPICIOUS_MESSAGE: &str = "Suspicious activity detected.";

/// Where one submit interaction stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Checking,
    RateLimited { retry_after_ms: u64 },
    Invalid { field_errors: FieldErrors },
    Suspicious { reason: SuspicionReason },
    Sending,
    Succeeded,
    /// `cause` is a diagnostic category, not user-facing text.
    Failed { cause: &'static str },
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SubmissionState::Idle | SubmissionState::Checking | SubmissionState::Sending
        )
    }

    /// Only a delivered submission clears the form.
    pub fn clears_form(&self) -> bool {
        matches!(self, SubmissionState::Succeeded)
    }

    /// Short, non-technical text for the submitter.
    pub fn user_message(&self) -> Option<String> {
        match self {
            SubmissionState::Idle | SubmissionState::Checking | SubmissionState::Sending => None,
            SubmissionState::RateLimited { retry_after_ms } => {
                let minutes = retry_after_ms.div_ceil(60_000).max(1);
                Some(format!("Too many attempts. Please wait {minutes} minute(s)."))
            }
            SubmissionState::Invalid { .. } => Some(INVALID_MESSAGE.to_string()),
            SubmissionState::Suspicious { .. } => Some(SUSPICIOUS_MESSAGE.to_string()),
            SubmissionState::Succeeded => Some(SUCCESS_MESSAGE.to_string()),
            SubmissionState::Failed { .. } => Some(FAILURE_MESSAGE.to_string()),
        }
    }
}

/// Assembles an orchestrator; store, clock and analytics are injected here.
pub struct OrchestratorBuilder {
    config: GuardConfig,
    relay: Arc<dyn RelayClient>,
    store: Arc<dyn AttemptStore>,
    clock: Arc<dyn Clock>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl OrchestratorBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn build(self) -> SubmissionOrchestrator {
        let rendered_at_ms = self.clock.now_ms();
        SubmissionOrchestrator {
            limiter: RateLimiter::new(self.store, self.clock.clone(), &self.config.rate_limit),
            fields: FieldValidator::new(),
            threats: ThreatDetector::new(&self.config.threats, &self.config.timing),
            relay: self.relay,
            analytics: self.analytics,
            clock: self.clock,
            submit_timeout: Duration::from_secs(self.config.client.submit_timeout_secs),
            rendered_at_ms,
            state: SubmissionState::Idle,
        }
    }
}

pub struct SubmissionOrchestrator {
    limiter: RateLimiter,
    fields: FieldValidator,
    threats: ThreatDetector,
    relay: Arc<dyn RelayClient>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    submit_timeout: Duration,
    rendered_at_ms: u64,
    state: SubmissionState,
}

impl SubmissionOrchestrator {
    pub fn builder(
        config: &GuardConfig,
        store: Arc<dyn AttemptStore>,
        relay: Arc<dyn RelayClient>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config: config.clone(),
            relay,
            store,
            clock: Arc::new(SystemClock),
            analytics: Arc::new(NoopAnalytics),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Back to `Idle` with a freshly rendered form.
    pub fn rearm(&mut self) {
        self.state = SubmissionState::Idle;
        self.rendered_at_ms = self.clock.now_ms();
    }

    /// Override when the form was shown, e.g. when rendering happened elsewhere.
    pub fn set_rendered_at(&mut self, rendered_at_ms: u64) {
        self.rendered_at_ms = rendered_at_ms;
    }

    pub fn can_submit(&self) -> RateLimitCheck {
        self.limiter.can_submit()
    }

    /// Attach the fill time to a captured form.
    pub fn capture(&self, form: ContactForm) -> FormCapture {
        let elapsed_ms = self.clock.now_ms().saturating_sub(self.rendered_at_ms);
        FormCapture::new(form, elapsed_ms)
    }

    /// Field rules and threat checks without touching the limiter.
    pub fn validate(&self, capture: &FormCapture) -> GuardDecision {
        self.inspect(capture).0
    }

    fn inspect(&self, capture: &FormCapture) -> (GuardDecision, ThreatReport) {
        let report = self.threats.detect(capture);
        if report.suspicion().is_some() {
            return (report.decide(Default::default()), report);
        }
        (report.decide(self.fields.validate(&capture.form)), report)
    }

    /// Run one submit interaction to a terminal state.
    pub async fn submit(&mut self, form: ContactForm) -> SubmissionState {
        self.state = SubmissionState::Checking;

        let check = self.limiter.can_submit();
        if !check.allowed {
            let retry_after_ms = check.retry_after_ms.unwrap_or_default();
            self.conclude(&GuardDecision::RateLimited { retry_after_ms });
            self.analytics.track(GuardEvent::RateLimited);
            return self.settle(SubmissionState::RateLimited { retry_after_ms });
        }

        let capture = self.capture(form);
        let (decision, report) = self.inspect(&capture);
        self.conclude(&decision);
        match decision {
            GuardDecision::Suspicious { reason } => {
                self.analytics.track(match reason {
                    SuspicionReason::HoneypotFilled => GuardEvent::HoneypotTripped,
                    _ => GuardEvent::TimingFailed,
                });
                return self.settle(SubmissionState::Suspicious { reason });
            }
            GuardDecision::Rejected { field_errors } => {
                self.track_rejection(&report);
                return self.settle(SubmissionState::Invalid { field_errors });
            }
            GuardDecision::RateLimited { .. } | GuardDecision::Allowed => {}
        }

        let payload = match self.fields.accept(&capture.form) {
            Ok(payload) => sanitize_payload(&payload),
            Err(field_errors) => {
                self.analytics.track(GuardEvent::ValidationFailed);
                return self.settle(SubmissionState::Invalid { field_errors });
            }
        };

        self.limiter.record_attempt();
        self.state = SubmissionState::Sending;

        let relay = self.relay.clone();
        let outbound = payload.clone();
        let result = race_detached(async move { relay.send(&outbound).await }, self.submit_timeout)
            .await
            .unwrap_or_else(|e| {
                Err(match e {
                    DeadlineError::Elapsed(d) => TransportError::Timeout(d.as_millis() as u64),
                    DeadlineError::Aborted(detail) => TransportError::Aborted(detail),
                })
            });

        match result {
            Ok(_) => {
                tracing::info!(service = %payload.service(), "Submission delivered");
                self.analytics.track(GuardEvent::SubmissionSucceeded {
                    service: payload.service(),
                    has_phone: payload.phone().is_some(),
                });
                self.rendered_at_ms = self.clock.now_ms();
                self.settle(SubmissionState::Succeeded)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Submission not delivered");
                self.analytics.track(match e {
                    TransportError::Status { .. } | TransportError::Rejected(_) => {
                        GuardEvent::RelayRejected
                    }
                    _ => GuardEvent::SubmissionError,
                });
                self.settle(SubmissionState::Failed { cause: e.kind() })
            }
        }
    }

    fn track_rejection(&self, report: &ThreatReport) {
        if !report.spam_terms.is_empty() {
            self.analytics.track(GuardEvent::SpamDetected);
        }
        if report.injection_suspected() {
            self.analytics.track(GuardEvent::InjectionDetected);
        }
        self.analytics.track(GuardEvent::ValidationFailed);
    }

    fn conclude(&self, decision: &GuardDecision) {
        tracing::debug!(decision = decision.label(), "Guard decision");
        metrics::record_guard_decision(decision.label());
    }

    fn settle(&mut self, state: SubmissionState) -> SubmissionState {
        self.state = state.clone();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_rounds_minutes_up() {
        let state = SubmissionState::RateLimited { retry_after_ms: 60_001 };
        assert_eq!(
            state.user_message().unwrap(),
            "Too many attempts. Please wait 2 minute(s)."
        );
        let state = SubmissionState::RateLimited { retry_after_ms: 1 };
        assert!(state.user_message().unwrap().contains("1 minute"));
    }

    #[test]
    fn test_failure_message_hides_cause() {
        let state = SubmissionState::Failed { cause: "timeout" };
        assert_eq!(state.user_message().unwrap(), FAILURE_MESSAGE);
        assert!(state.is_terminal());
        assert!(!state.clears_form());
    }

    #[test]
    fn test_suspicious_message_hides_reason() {
        let state = SubmissionState::Suspicious { reason: SuspicionReason::HoneypotFilled };
        assert!(!state.user_message().unwrap().contains("honeypot"));
    }
}
