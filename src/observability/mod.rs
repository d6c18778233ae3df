//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! guard + relay produce:
//!     → logging.rs (structured log events: the developer-facing channel)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Diagnostic detail goes here and never into responses or user messages
//! - Secrets are never logged; upstream errors are stripped of URLs first
//! - Request ID flows through relay logs

pub mod logging;
pub mod metrics;
