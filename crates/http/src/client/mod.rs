//! Portal HTTP client

pub mod auth_typed;
pub mod error;
pub mod typed;

pub use typed::{AuthenticatedPortalClient, PublicPortalClient, TypedClientBuilder};

use error::{ClientError, field_errors, server_message};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub(crate) const USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));

/// Send a request and decode a JSON body, mapping failures to [`ClientError`]
///
/// A success status whose body still carries an `error` member is treated as a
/// failure; the sign-up endpoint reports validation problems that way.
pub(crate) async fn execute<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!(status = status.as_u16(), "Received response");

    if !status.is_success() {
        return Err(ClientError::from_response(status, &body));
    }

    let value: Value = serde_json::from_str(&body)?;
    if value.get("error").is_some_and(|e| !e.is_null()) {
        if let Some(fields) = field_errors(&value) {
            return Err(ClientError::ValidationFailed(fields));
        }
        return Err(ClientError::AuthRejected {
            status: status.as_u16(),
            message: server_message(&value).unwrap_or_else(|| status.to_string()),
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// Send a request whose success body is irrelevant
pub(crate) async fn execute_empty(request: reqwest::RequestBuilder) -> Result<(), ClientError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(status = status.as_u16(), "Received response");

    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_response(status, &body))
    }
}
