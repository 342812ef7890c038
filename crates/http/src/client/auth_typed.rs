//! Authentication endpoints

use super::{
    error::ClientError,
    execute, execute_empty,
    typed::{AuthenticatedPortalClient, PublicPortalClient},
};
use crate::types::{
    AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest,
    SocialLoginRequest, SocialProvider,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Authentication endpoints for public client
impl PublicPortalClient {
    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// `AuthRejected` for refused credentials, `Request` when the server is
    /// unreachable, `Protocol` when the response omits the refresh token
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        debug!("Signing in");
        let req = self
            .request(Method::POST, &self.endpoints().login)
            .json(request);
        let response: AuthResponse = execute(req).await?;
        if response.refresh_token.is_none() {
            return Err(ClientError::Protocol(
                "sign-in response is missing refresh_token".to_string(),
            ));
        }
        Ok(response)
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// `ValidationFailed` with the server's per-field messages, or any
    /// transport/status error
    #[instrument(skip_all, fields(email = %request.email, username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        debug!("Registering");
        let req = self
            .request(Method::POST, &self.endpoints().register)
            .json(request);
        execute(req).await
    }

    /// Exchange a refresh token for a new access token
    ///
    /// # Errors
    ///
    /// `TokenInvalid` for any 4xx answer or an `error` body, whatever its shape
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        debug!("Refreshing access token");
        let req = self
            .request(Method::POST, &self.endpoints().refresh)
            .json(&RefreshRequest { refresh_token });
        execute(req).await.map_err(|e| match e {
            ClientError::AuthRejected { message, .. } => ClientError::TokenInvalid(message),
            // `{"error": {...}}` on this endpoint is a rejection, not a form error
            rejected @ ClientError::ValidationFailed(_) => {
                let message = rejected.user_message();
                ClientError::TokenInvalid(if message.is_empty() {
                    "Refresh token rejected".to_string()
                } else {
                    message
                })
            }
            other => other,
        })
    }

    /// Exchange an identity provider token for a portal session
    ///
    /// # Errors
    ///
    /// Any transport/status error; the caller reports them as a notification
    #[instrument(skip_all, fields(%provider))]
    pub async fn exchange_provider_token(
        &self,
        provider: SocialProvider,
        provider_token: &str,
    ) -> Result<AuthResponse, ClientError> {
        debug!("Exchanging provider token");
        let path = match provider {
            SocialProvider::Google => &self.endpoints().google,
            SocialProvider::Facebook => &self.endpoints().facebook,
        };
        let req = self.request(Method::POST, path).json(&SocialLoginRequest {
            access_token: provider_token,
        });
        execute(req).await
    }
}

/// Endpoints that carry the `Authorization` header
impl AuthenticatedPortalClient {
    /// Tell the server the session is over
    ///
    /// # Errors
    ///
    /// Any transport/status error; callers treat logout as best-effort
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ClientError> {
        debug!("Notifying server of logout");
        let req = self.request(Method::POST, &self.endpoints().logout);
        execute_empty(req).await
    }

    /// GET an arbitrary JSON resource with the session's credentials
    ///
    /// # Errors
    ///
    /// Any transport/status error or an undecodable body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.request(Method::GET, path);
        execute(req).await
    }
}
