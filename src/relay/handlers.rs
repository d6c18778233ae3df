//! Axum handlers for the relay endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::config::GuardConfig;
use crate::guard::form::ContactForm;
use crate::http::request::request_id;
use crate::http::response::RelayResponse;
use crate::observability::metrics;
use crate::relay::formatter::{MessageFormatter, RequestContext};
use crate::relay::secrets::{RelayConfig, SecretsError};
use crate::relay::transport::{DeliveryError, NotificationTransport, TelegramTransport};
use crate::relay::types::RelayError;
use crate::relay::validator::RelayValidator;

/// Shared, read-only state of the relay. Nothing here changes after startup.
pub struct RelayState {
    validator: RelayValidator,
    formatter: MessageFormatter,
    transport: Result<Arc<dyn NotificationTransport>, SecretsError>,
}

impl RelayState {
    pub fn new(
        config: &GuardConfig,
        transport: Result<Arc<dyn NotificationTransport>, SecretsError>,
    ) -> Self {
        Self {
            validator: RelayValidator::new(&config.threats),
            formatter: MessageFormatter::new(config.relay.markup_mode.clone()),
            transport,
        }
    }

    /// Build the state around the Telegram transport, or around the missing secret.
    pub fn from_secrets(
        config: &GuardConfig,
        secrets: Result<RelayConfig, SecretsError>,
    ) -> Result<Self, DeliveryError> {
        let transport = match secrets {
            Ok(secrets) => {
                let transport = TelegramTransport::new(&config.relay, secrets)?;
                Ok(Arc::new(transport) as Arc<dyn NotificationTransport>)
            }
            Err(e) => Err(e),
        };
        Ok(Self::new(config, transport))
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_ok()
    }
}

/// `POST {relay.path}`.
pub async fn contact(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<RelayResponse>, RelayError> {
    let request_id = request_id(&headers);

    match relay(&state, &headers, body).await {
        Ok(()) => {
            tracing::info!(request_id = %request_id, "Contact request delivered");
            metrics::record_relay_request("delivered");
            Ok(Json(RelayResponse::delivered()))
        }
        Err(e) => {
            match &e {
                RelayError::Validation(_) | RelayError::BadRequest(_) => {
                    tracing::info!(request_id = %request_id, error = %e, "Contact request rejected")
                }
                _ => tracing::error!(request_id = %request_id, error = %e, "Contact request failed"),
            }
            metrics::record_relay_request(e.outcome());
            Err(e)
        }
    }
}

async fn relay(
    state: &RelayState,
    headers: &HeaderMap,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(), RelayError> {
    let Json(form) = body.map_err(|e| RelayError::BadRequest(e.body_text()))?;

    let payload = state.validator.check(&form).map_err(RelayError::Validation)?;

    let transport = state.transport.as_ref().map_err(|e| e.clone())?;

    let context = RequestContext::now(header_value(headers, "origin"), client_ip(headers));
    let message = state.formatter.format(&payload, &context);

    let start = Instant::now();
    let delivered = transport.deliver(&message).await;
    metrics::record_delivery(start, delivered.is_ok());
    delivered?;

    Ok(())
}

/// `OPTIONS {relay.path}`; CORS headers come from the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the relay path.
pub async fn method_not_allowed() -> RelayError {
    metrics::record_relay_request(RelayError::MethodNotAllowed.outcome());
    RelayError::MethodNotAllowed
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "configured": state.is_configured(),
    }))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `client-ip`, else the first hop of `x-forwarded-for`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "client-ip").or_else(|| {
        header_value(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
            .filter(|hop| !hop.is_empty())
    })
}
