//! Type-safe API clients that enforce authentication requirements at compile time

use super::{ClientError, USER_AGENT};
use portal_core::config::{EndpointConfig, PortalConfig};
use reqwest::{Client, ClientBuilder, header};

/// Client for endpoints that don't require a session
#[derive(Clone, Debug)]
pub struct PublicPortalClient {
    client: Client,
    base_url: String,
    endpoints: EndpointConfig,
    token_type: String,
}

/// Client for endpoints that require an access token
#[derive(Clone)]
pub struct AuthenticatedPortalClient {
    client: Client,
    base_url: String,
    endpoints: EndpointConfig,
    token_type: String,
    access_token: String,
}

impl PublicPortalClient {
    /// Create a public client with default endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        TypedClientBuilder::new().base_url(base_url).build_public()
    }

    /// Create a public client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the HTTP client cannot be built
    pub fn from_config(config: &PortalConfig) -> Result<Self, ClientError> {
        TypedClientBuilder::from_config(config).build_public()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint paths in use
    pub const fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Attach an access token to get an authenticated client
    pub fn authenticate(self, access_token: impl Into<String>) -> AuthenticatedPortalClient {
        AuthenticatedPortalClient {
            client: self.client,
            base_url: self.base_url,
            endpoints: self.endpoints,
            token_type: self.token_type,
            access_token: access_token.into(),
        }
    }
}

impl AuthenticatedPortalClient {
    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint paths in use
    pub const fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// `Authorization` header value, e.g. `Bearer <token>`
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Create a request builder with authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, self.authorization())
    }
}

impl std::fmt::Debug for AuthenticatedPortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedPortalClient")
            .field("base_url", &self.base_url)
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

/// Type-safe builder that creates the appropriate client type
#[derive(Debug, Default)]
pub struct TypedClientBuilder {
    base_url: Option<String>,
    endpoints: EndpointConfig,
    token_type: Option<String>,
}

impl TypedClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with base URL, endpoints and token type
    pub fn from_config(config: &PortalConfig) -> Self {
        Self {
            base_url: Some(config.api.base_url.clone()),
            endpoints: config.endpoints.clone(),
            token_type: Some(config.api.token_type.clone()),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the endpoint paths
    #[must_use]
    pub fn endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the authorization scheme (defaults to `Bearer`)
    #[must_use]
    pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Build a public client
    ///
    /// # Errors
    ///
    /// Returns an error if no non-empty base URL was set or the HTTP client cannot be built
    pub fn build_public(self) -> Result<PublicPortalClient, ClientError> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(PublicPortalClient {
            client,
            base_url,
            endpoints: self.endpoints,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        })
    }

    /// Build an authenticated client
    ///
    /// # Errors
    ///
    /// Returns an error if no non-empty base URL was set or the HTTP client cannot be built
    pub fn build_authenticated(
        self,
        access_token: impl Into<String>,
    ) -> Result<AuthenticatedPortalClient, ClientError> {
        Ok(self.build_public()?.authenticate(access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = PublicPortalClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn base_url_is_required() {
        assert!(matches!(
            TypedClientBuilder::new().build_public(),
            Err(ClientError::Configuration(_))
        ));
        assert!(matches!(
            PublicPortalClient::new("  "),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn authorization_uses_token_type() {
        let client = TypedClientBuilder::new()
            .base_url("http://localhost")
            .build_authenticated("T1")
            .unwrap();
        assert_eq!(client.authorization(), "Bearer T1");

        let client = TypedClientBuilder::new()
            .base_url("http://localhost")
            .token_type("JWT")
            .build_authenticated("T1")
            .unwrap();
        assert_eq!(client.authorization(), "JWT T1");
        assert!(!format!("{client:?}").contains("T1"));
    }

    #[test]
    fn from_config_copies_endpoints() {
        let mut config = PortalConfig::with_base_url("http://localhost:3000");
        config.endpoints.login = "/v2/login".into();
        let client = PublicPortalClient::from_config(&config).unwrap();
        assert_eq!(client.endpoints().login, "/v2/login");
    }
}
