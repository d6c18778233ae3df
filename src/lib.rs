//! Contact-form submission guard and trusted relay.

pub mod config;
pub mod guard;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;

pub use config::schema::GuardConfig;
pub use guard::{SubmissionOrchestrator, SubmissionState};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{RelayConfig, RelayState};
