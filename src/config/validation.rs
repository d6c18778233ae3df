//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows, caps and timeouts > 0)
//! - Check URLs and socket addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GuardConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("timing.min_fill_ms ({min}) must be below timing.max_fill_ms ({max})")]
    FillWindowInverted { min: u64, max: u64 },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("relay.path must start with '/': {0}")]
    InvalidPath(String),

    #[error("threats.spam_terms contains an empty entry")]
    EmptySpamTerm,

    #[error("rate_limit.storage_key must be non-empty and free of path separators")]
    InvalidStorageKey,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.max_attempts == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.max_attempts" });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.window_secs" });
    }
    let key = &config.rate_limit.storage_key;
    if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
        errors.push(ValidationError::InvalidStorageKey);
    }

    if config.timing.min_fill_ms >= config.timing.max_fill_ms {
        errors.push(ValidationError::FillWindowInverted {
            min: config.timing.min_fill_ms,
            max: config.timing.max_fill_ms,
        });
    }

    if config.threats.spam_terms.iter().any(|t| t.trim().is_empty()) {
        errors.push(ValidationError::EmptySpamTerm);
    }

    if config.client.submit_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "client.submit_timeout_secs" });
    }
    if config.relay.upstream_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "relay.upstream_timeout_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    if !config.relay.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.relay.path.clone()));
    }

    for (field, value) in [
        ("relay.api_base_url", &config.relay.api_base_url),
        ("client.relay_url", &config.client.relay_url),
    ] {
        if Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl { field, value: value.clone() });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
