//! Client-side submission guard.
//!
//! # Data Flow
//! ```text
//! form capture (untyped strings + fill time)
//!     → rate_limit.rs  (attempt cap per storage key, backed by store.rs)
//!     → threats.rs     (honeypot, timing, spam terms, injection patterns)
//!     → fields.rs      (structural rules → typed SubmissionPayload)
//!     → sanitize.rs    (escape free text)
//!     → transport.rs   (POST to the relay, raced against the submit deadline)
//!
//! orchestrator.rs sequences the above and maps outcomes to SubmissionState.
//! analytics.rs receives abuse/conversion events.
//! ```
//!
//! # Design Decisions
//! - Client-side checks are a courtesy, not a security boundary; the relay re-validates
//! - Store, clock, relay client and analytics sink are injected, never global
//! - All failures resolve to a state; nothing propagates past the orchestrator

pub mod analytics;
pub mod clock;
pub mod decision;
pub mod fields;
pub mod form;
pub mod orchestrator;
pub mod rate_limit;
pub mod sanitize;
pub mod store;
pub mod threats;
pub mod transport;

pub use analytics::{AnalyticsSink, GuardEvent, NoopAnalytics, TracingAnalytics};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decision::{FieldErrors, GuardDecision, SuspicionReason, ValidationResult};
pub use fields::FieldValidator;
pub use form::{ContactForm, Field, FormCapture, ServiceKind, SubmissionPayload};
pub use orchestrator::{SubmissionOrchestrator, SubmissionState};
pub use rate_limit::{RateLimitCheck, RateLimiter};
pub use sanitize::sanitize;
pub use store::{AttemptRecord, AttemptStore, FileAttemptStore, MemoryAttemptStore, StoreError};
pub use threats::{ThreatDetector, ThreatReport};
pub use transport::{HttpRelayClient, RelayAck, RelayClient, TransportError};
