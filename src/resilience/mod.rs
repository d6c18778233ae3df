//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client submit:
//!     → timeouts.rs (race the relay call against the submit deadline)
//!     → on timeout: report failure, never retry automatically
//!
//! Relay delivery:
//!     → reqwest client timeout on the messaging API call
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No automatic retries: the submitter retries by resubmitting, bounded by
//!   the rate-limit window

pub mod timeouts;
