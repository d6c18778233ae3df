//! Client-side call to the relay.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::guard::form::SubmissionPayload;

/// Relay response body: `{success, message?, error?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayAck {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Why a relay call did not produce a positive acknowledgement.
///
/// Diagnostic only: none of these texts reach the submitter.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("relay answered {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("relay refused the submission: {0}")]
    Rejected(String),

    #[error("relay response unreadable: {0}")]
    Malformed(String),

    #[error("no answer within {0} ms")]
    Timeout(u64),

    #[error("relay call aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Network(_) => "network",
            TransportError::Status { .. } => "status",
            TransportError::Rejected(_) => "rejected",
            TransportError::Malformed(_) => "malformed",
            TransportError::Timeout(_) => "timeout",
            TransportError::Aborted(_) => "aborted",
        }
    }
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Deliver a sanitized payload; `Ok` only on a positive acknowledgement.
    async fn send(&self, payload: &SubmissionPayload) -> Result<RelayAck, TransportError>;
}

/// Posts JSON to the relay over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, payload: &SubmissionPayload) -> Result<RelayAck, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<RelayAck>(&body)
                .ok()
                .and_then(|ack| ack.error)
                .unwrap_or(body);
            return Err(TransportError::Status { status, detail });
        }

        let ack: RelayAck =
            serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))?;
        if !ack.success {
            return Err(TransportError::Rejected(
                ack.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        Ok(ack)
    }
}
