//! Seam between the session controller and the authentication backend

use async_trait::async_trait;
use portal_http::{
    AuthResponse, ClientError, LoginRequest, PublicPortalClient, RefreshResponse,
    RegisterRequest, SocialProvider,
};

/// The requests the session controller issues
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError>;

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError>;

    /// Trade an identity provider token for a portal session
    async fn exchange_provider_token(
        &self,
        provider: SocialProvider,
        provider_token: &str,
    ) -> Result<AuthResponse, ClientError>;

    /// Tell the server the session identified by `access_token` is over
    async fn logout(&self, access_token: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl AuthApi for PublicPortalClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        Self::login(self, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        Self::register(self, request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        Self::refresh(self, refresh_token).await
    }

    async fn exchange_provider_token(
        &self,
        provider: SocialProvider,
        provider_token: &str,
    ) -> Result<AuthResponse, ClientError> {
        Self::exchange_provider_token(self, provider, provider_token).await
    }

    async fn logout(&self, access_token: &str) -> Result<(), ClientError> {
        self.clone().authenticate(access_token).logout().await
    }
}
