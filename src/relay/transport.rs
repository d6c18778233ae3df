//! Delivery to the external messaging API.
//!
//! # Responsibilities
//! - POST the rendered message with the trusted credential
//! - Treat anything but an affirmative acknowledgement as failure
//!
//! # Security
//! - The credential is part of the request URL; reqwest errors are stripped of
//!   their URL before they are logged or wrapped

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RelaySettings;
use crate::relay::formatter::OutboundMessage;
use crate::relay::secrets::RelayConfig;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("messaging API unreachable: {0}")]
    Network(String),

    #[error("messaging API timed out")]
    Timeout,

    #[error("messaging API answered {status}: {description}")]
    Status { status: u16, description: String },

    #[error("messaging API did not acknowledge: {0}")]
    NotAcknowledged(String),

    #[error("messaging API response unreadable: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// `sendMessage` acknowledgement.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiAck {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API transport.
#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    endpoint: String,
    secrets: RelayConfig,
}

impl TelegramTransport {
    pub fn new(settings: &RelaySettings, secrets: RelayConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.upstream_timeout_secs))
            .build()
            .map_err(|e| DeliveryError::Network(e.without_url().to_string()))?;

        let endpoint = format!(
            "{}/bot{}/sendMessage",
            settings.api_base_url.trim_end_matches('/'),
            secrets.bot_credential()
        );

        Ok(Self {
            client,
            endpoint,
            secrets,
        })
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("secrets", &self.secrets)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationTransport for TelegramTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let body = SendMessage {
            chat_id: self.secrets.destination_channel_id(),
            text: &message.text,
            parse_mode: &message.markup_mode,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DeliveryError::Network(e.without_url().to_string()))?;
        let ack: Option<ApiAck> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                description: ack
                    .and_then(|a| a.description)
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        match ack {
            Some(ApiAck { ok: true, .. }) => Ok(()),
            Some(ApiAck { description, .. }) => Err(DeliveryError::NotAcknowledged(
                description.unwrap_or_else(|| "ok=false".to_string()),
            )),
            None => Err(DeliveryError::Malformed(format!("{} bytes of non-JSON", text.len()))),
        }
    }
}
