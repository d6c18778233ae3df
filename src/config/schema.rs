//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard and
//! its relay. All types derive Serde traits for deserialization from config files.
//! Secrets are deliberately absent: see `relay::secrets`.

use serde::{Deserialize, Serialize};

/// Spam terms matched against the message body when no override is configured.
pub const DEFAULT_SPAM_TERMS: &[&str] = &["viagra", "casino", "crypto", "http", "www", ".ru", ".com"];

/// Root configuration for the submission guard and relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Relay endpoint and external messaging API settings.
    pub relay: RelaySettings,

    /// Client-side attempt throttling.
    pub rate_limit: RateLimitConfig,

    /// Form fill-time heuristic bounds.
    pub timing: TimingConfig,

    /// Content screening settings.
    pub threats: ThreatConfig,

    /// Settings used by the client half (CLI or embedding UI).
    pub client: ClientConfig,

    /// Server-side timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Relay endpoint and upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Path the contact endpoint is mounted on.
    pub path: String,

    /// Base URL of the external messaging API (bot credential is appended per call).
    pub api_base_url: String,

    /// Markup mode passed to the messaging API.
    pub markup_mode: String,

    /// Upper bound for a single delivery attempt, in seconds.
    pub upstream_timeout_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path: "/api/contact".to_string(),
            api_base_url: "https://api.telegram.org".to_string(),
            markup_mode: "HTML".to_string(),
            upstream_timeout_secs: 8,
        }
    }
}

/// Rate limiting configuration (fixed window with full reset).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum accepted attempts inside one window.
    pub max_attempts: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Key the attempt record is stored under.
    pub storage_key: String,
}

impl RateLimitConfig {
    pub fn window_ms(&self) -> u64 {
        self.window_secs.saturating_mul(1000)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_secs: 10 * 60,
            storage_key: "formRateLimit".to_string(),
        }
    }
}

/// Bounds on the time a human plausibly spends filling the form.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Anything faster is treated as automation.
    pub min_fill_ms: u64,

    /// Anything slower is treated as a stale or replayed form.
    pub max_fill_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_fill_ms: 3_000,
            max_fill_ms: 300_000,
        }
    }
}

/// Content screening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThreatConfig {
    /// Case-insensitive substrings rejected in the message body.
    pub spam_terms: Vec<String>,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            spam_terms: DEFAULT_SPAM_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Client-half configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the relay contact endpoint.
    pub relay_url: String,

    /// Hard upper bound on the relay call, in seconds.
    pub submit_timeout_secs: u64,

    /// Directory holding persisted attempt records.
    pub state_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:8080/api/contact".to_string(),
            submit_timeout_secs: 10,
            state_dir: ".contact-guard".to_string(),
        }
    }
}

/// Timeout configuration for the relay server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 15 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Answer cross-origin requests with permissive CORS headers.
    pub cors_enabled: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            max_body_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let config = GuardConfig::default();
        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.rate_limit.window_ms(), 600_000);
        assert_eq!(config.timing.min_fill_ms, 3_000);
        assert_eq!(config.timing.max_fill_ms, 300_000);
        assert_eq!(config.client.submit_timeout_secs, 10);
        assert!(config.threats.spam_terms.iter().any(|t| t == "viagra"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GuardConfig = toml::from_str(
            r#"
            [rate_limit]
            max_attempts = 5

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window_secs, 600);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.relay.path, "/api/contact");
    }
}
