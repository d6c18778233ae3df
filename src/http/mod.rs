//! HTTP surface of the relay.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign x-request-id)
//!     → relay::handlers (validate, format, deliver)
//!     → response.rs ({success, message?, error?} + status mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::RelayResponse;
pub use server::HttpServer;
