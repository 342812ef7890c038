//! Client error types

use crate::types::FieldErrors;
use serde_json::Value;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response: connection refused, DNS, TLS, or the body could not be read
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server refused the credentials or the request
    #[error("{message}")]
    AuthRejected { status: u16, message: String },

    /// Field-level validation errors reported by the server
    #[error("Validation failed: {}", format_fields(.0))]
    ValidationFailed(FieldErrors),

    /// The refresh token is invalid or expired
    #[error("Token invalid: {0}")]
    TokenInvalid(String),

    /// Server returned an unexpected status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered successfully but broke the response contract
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create an error from a non-success status and its raw body
    ///
    /// Bodies of the form `{"error": {"field": "message"}}` become
    /// [`ClientError::ValidationFailed`]; otherwise the message is taken from
    /// `error`, then `message`, then the raw text.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();

        if let Some(fields) = parsed.as_ref().and_then(field_errors) {
            return Self::ValidationFailed(fields);
        }

        let message = parsed
            .as_ref()
            .and_then(server_message)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| status.to_string());

        if status.is_client_error() {
            Self::AuthRejected {
                status: status.as_u16(),
                message,
            }
        } else {
            Self::ServerError {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Message suitable for showing next to a form field
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRejected { message, .. }
            | Self::TokenInvalid(message)
            | Self::ServerError { message, .. } => message.clone(),
            Self::ValidationFailed(fields) => format_fields(fields),
            Self::Request(_) => "Unable to reach the server. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure happened before any response arrived
    pub const fn is_network_failure(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// `{"error": {"field": "message" | null, ...}}`, dropping null entries
pub(crate) fn field_errors(body: &Value) -> Option<FieldErrors> {
    let map = body.get("error")?.as_object()?;
    let fields: FieldErrors = map
        .iter()
        .filter_map(|(field, message)| match message {
            Value::String(s) => Some((field.clone(), s.clone())),
            Value::Array(items) => items
                .iter()
                .find_map(Value::as_str)
                .map(|s| (field.clone(), s.to_string())),
            _ => None,
        })
        .collect();
    Some(fields)
}

/// `{"error": "message"}` or `{"message": "message"}`
pub(crate) fn server_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(ToString::to_string)
}

fn format_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_string_becomes_auth_rejected() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Invalid credentials"}"#,
        );
        assert!(matches!(
            &err,
            ClientError::AuthRejected { status: 400, message } if message == "Invalid credentials"
        ));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn error_object_becomes_validation_failed() {
        let err = ClientError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":{"email":"This email is already in use.","username":null}}"#,
        );
        let ClientError::ValidationFailed(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["email"], "This email is already in use.");
    }

    #[test]
    fn message_and_plain_text_fallbacks() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, r#"{"message":"expired"}"#);
        assert_eq!(err.user_message(), "expired");

        let err = ClientError::from_response(StatusCode::FORBIDDEN, "Forbidden");
        assert_eq!(err.user_message(), "Forbidden");

        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ClientError::ServerError { status: 502, .. }));
        assert_eq!(err.user_message(), "502 Bad Gateway");
    }
}
