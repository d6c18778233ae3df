//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - One JSON shape for every relay answer: `{success, message?, error?}`
//! - Map `RelayError` to a status code and a generic client-facing string
//!
//! # Design Decisions
//! - Internal detail (missing variable names, upstream descriptions) never
//!   reaches the body; it is logged where the error is raised
//! - Validation errors are the exception: their joined messages are the body
//! - Middleware rejections (timeout, oversized body) are rewritten into the
//!   same shape on the way out

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::relay::types::RelayError;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully";
pub const INVALID_BODY: &str = "Invalid request body";
pub const CONFIGURATION_ERROR: &str = "Server configuration error";
pub const DELIVERY_ERROR: &str = "Failed to deliver message";
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const REQUEST_TIMEOUT: &str = "Request timed out";
pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn delivered() -> Self {
        Self {
            success: true,
            message: Some(SUCCESS_MESSAGE.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Configuration(_) | RelayError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The only text a client ever sees for this error.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Validation(errors) => errors.joined(),
            RelayError::BadRequest(_) => INVALID_BODY.to_string(),
            RelayError::Configuration(_) => CONFIGURATION_ERROR.to_string(),
            RelayError::Delivery(_) => DELIVERY_ERROR.to_string(),
            RelayError::MethodNotAllowed => METHOD_NOT_ALLOWED.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(RelayResponse::failed(self.public_message()))).into_response()
    }
}

/// Replace the plain bodies of middleware rejections with a [`RelayResponse`].
pub async fn json_error_bodies(response: Response) -> Response {
    let error = match response.status() {
        StatusCode::REQUEST_TIMEOUT => REQUEST_TIMEOUT,
        StatusCode::PAYLOAD_TOO_LARGE => PAYLOAD_TOO_LARGE,
        _ => return response,
    };

    let (parts, _) = response.into_parts();
    let mut rebuilt = (parts.status, Json(RelayResponse::failed(error))).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::decision::FieldErrors;
    use crate::guard::form::Field;
    use crate::relay::secrets::{SecretsError, BOT_TOKEN_ENV_VAR};
    use crate::relay::transport::DeliveryError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::Validation(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::BadRequest("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Delivery(DeliveryError::Timeout).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_configuration_error_hides_variable() {
        let err = RelayError::Configuration(SecretsError::Missing(BOT_TOKEN_ENV_VAR));
        assert_eq!(err.public_message(), CONFIGURATION_ERROR);
        assert!(!err.public_message().contains(BOT_TOKEN_ENV_VAR));
    }

    #[test]
    fn test_validation_message_is_joined() {
        let mut errors = FieldErrors::new();
        errors.set(Field::Email, "Email is required");
        errors.set(Field::Message, "Message is required");
        assert_eq!(
            RelayError::Validation(errors).public_message(),
            "Email is required, Message is required"
        );
    }

    #[tokio::test]
    async fn test_middleware_rejections_become_json() {
        let plain = (
            StatusCode::PAYLOAD_TOO_LARGE,
            [("x-request-id", "abc")],
            "length limit exceeded",
        )
            .into_response();

        let response = json_error_bodies(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()["x-request-id"], "abc");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: RelayResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, RelayResponse::failed(PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = json_error_bodies(StatusCode::OK.into_response()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(RelayResponse::failed("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "error": "nope"}));
        let body = serde_json::to_value(RelayResponse::delivered()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": SUCCESS_MESSAGE})
        );
    }
}
