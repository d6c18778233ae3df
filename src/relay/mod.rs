//! Trusted relay between the public form and the messaging API.
//!
//! # Data Flow
//! ```text
//! POST {relay.path} (JSON, untrusted)
//!     → handlers.rs  (extract body, request context)
//!     → validator.rs (field rules + content scans on decoded text)
//!     → secrets.rs   (credential present? read once at startup)
//!     → formatter.rs (fixed template, escaped values, service label)
//!     → transport.rs (POST to the messaging API, check acknowledgement)
//!     → 200 {success:true} | 400/500 {success:false, error}
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the only shared state is read-only
//! - Validation runs before the configuration check, so bad input is a 400 even
//!   on a misconfigured relay
//! - types.rs holds the failure taxonomy; its HTTP mapping lives in `http::response`

pub mod formatter;
pub mod handlers;
pub mod secrets;
pub mod transport;
pub mod types;
pub mod validator;

pub use formatter::{MessageFormatter, OutboundMessage, RequestContext};
pub use handlers::RelayState;
pub use secrets::{RelayConfig, SecretsError};
pub use transport::{DeliveryError, NotificationTransport, TelegramTransport};
pub use types::RelayError;
pub use validator::RelayValidator;
