//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from CONTACT_GUARD_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → cloned into the guard, the relay state and the CLI
//!
//! Secrets (bot credential, channel id):
//!     → process environment only, see relay::secrets
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientConfig, GuardConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitConfig,
    RelaySettings, SecurityConfig, ThreatConfig, TimeoutConfig, TimingConfig,
};
