//! Portal configuration
//!
//! Configuration is supplied at process start and never mutated afterwards.
//! Sources are layered: built-in defaults, an optional file, then environment
//! variables prefixed with `PORTAL` using `__` as the section separator
//! (`PORTAL_API__BASE_URL=https://api.example.com`).

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed storage key names
pub struct StorageKeys;

impl StorageKeys {
    /// Key holding the access token
    pub const ACCESS_TOKEN: &'static str = "accessToken";

    /// Key holding the refresh token
    pub const REFRESH_TOKEN: &'static str = "refreshToken";

    /// Key holding the serialized session snapshot
    pub const USER_DATA: &'static str = "userData";
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Backend API settings
    pub api: ApiConfig,

    /// Endpoint paths relative to the API base URL
    pub endpoints: EndpointConfig,

    /// Navigation targets used after session transitions
    pub routes: RouteConfig,

    /// Social-login provider identifiers
    pub social: SocialConfig,

    /// Durable storage location
    pub storage: StorageConfig,

    /// Log output
    pub logging: LoggingConfig,
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Authorization scheme prefixed to the access token
    pub token_type: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_type: "Bearer".to_string(),
        }
    }
}

/// Endpoint paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub logout: String,
    pub google: String,
    pub facebook: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login: "/auth/signin".to_string(),
            register: "/auth/signup".to_string(),
            refresh: "/jwt/refresh-token".to_string(),
            logout: "/jwt/logout".to_string(),
            google: "/auth/google".to_string(),
            facebook: "/auth/facebook".to_string(),
        }
    }
}

/// Navigation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Home route for the `admin` role
    pub admin_home: String,

    /// Home route for the `client` role
    pub client_home: String,

    /// Login screen, also the fallback for unknown roles
    pub login: String,

    /// Where a fresh registration lands
    pub after_register: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            admin_home: "/".to_string(),
            client_home: "/access-control".to_string(),
            login: "/login".to_string(),
            after_register: "/".to_string(),
        }
    }
}

impl RouteConfig {
    /// Home route for a signed-in user with the given role
    pub fn home_for_role(&self, role: Option<&str>) -> &str {
        match role {
            Some("admin") => &self.admin_home,
            Some("client") => &self.client_home,
            _ => &self.login,
        }
    }
}

/// Social-login provider identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub google_client_id: Option<String>,
    pub facebook_app_id: Option<String>,
}

impl SocialConfig {
    /// Client or app id registered with `provider` (`google` or `facebook`)
    pub fn client_id(&self, provider: &str) -> Option<&str> {
        let id = match provider {
            "google" => self.google_client_id.as_deref(),
            "facebook" => self.facebook_app_id.as_deref(),
            _ => None,
        };
        id.filter(|id| !id.trim().is_empty())
    }
}

/// Durable storage location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform state directory
    pub data_dir: Option<PathBuf>,
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PortalConfig {
    /// Environment variable prefix
    pub const ENV_PREFIX: &'static str = "PORTAL";

    /// Load configuration from defaults, an optional file, and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a value has the
    /// wrong type, or the result fails [`PortalConfig::validate`]
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let config = Self::layered(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same layering as [`PortalConfig::load`] without validation, for callers
    /// that apply further overrides first
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed or a value has the
    /// wrong type
    pub fn layered(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check invariants that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is empty or the token type is blank
    pub fn validate(&self) -> CoreResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CoreError::invalid_config("api.base_url is required"));
        }
        if self.api.token_type.trim().is_empty() {
            return Err(CoreError::invalid_config("api.token_type must not be blank"));
        }
        Ok(())
    }

    /// Configuration pointing at the given API, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_backend_contract() {
        let config = PortalConfig::default();
        assert_eq!(config.api.token_type, "Bearer");
        assert_eq!(config.endpoints.login, "/auth/signin");
        assert_eq!(config.endpoints.register, "/auth/signup");
        assert_eq!(config.endpoints.refresh, "/jwt/refresh-token");
        assert_eq!(config.endpoints.logout, "/jwt/logout");
        assert_eq!(config.endpoints.google, "/auth/google");
        assert_eq!(config.endpoints.facebook, "/auth/facebook");
    }

    #[test]
    fn validate_requires_base_url() {
        let err = PortalConfig::default().validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
        assert!(PortalConfig::with_base_url("http://localhost:3000")
            .validate()
            .is_ok());
    }

    #[test]
    fn social_client_id_by_provider() {
        let social = SocialConfig {
            google_client_id: Some("google-123".to_string()),
            facebook_app_id: Some(" ".to_string()),
        };
        assert_eq!(social.client_id("google"), Some("google-123"));
        assert_eq!(social.client_id("facebook"), None);
        assert_eq!(social.client_id("github"), None);
    }

    #[test]
    fn home_route_depends_on_role() {
        let routes = RouteConfig::default();
        assert_eq!(routes.home_for_role(Some("admin")), "/");
        assert_eq!(routes.home_for_role(Some("client")), "/access-control");
        assert_eq!(routes.home_for_role(Some("guest")), "/login");
        assert_eq!(routes.home_for_role(None), "/login");
    }

    #[test]
    fn load_layers_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.example.com"

[routes]
admin_home = "/dashboard/ecommerce"

[social]
google_client_id = "google-123"
"#
        )
        .unwrap();

        let config = PortalConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.token_type, "Bearer");
        assert_eq!(config.routes.admin_home, "/dashboard/ecommerce");
        assert_eq!(config.routes.login, "/login");
        assert_eq!(config.social.google_client_id.as_deref(), Some("google-123"));
        assert_eq!(config.social.facebook_app_id, None);
    }

    #[test]
    fn load_rejects_missing_base_url() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        // Only meaningful when the environment does not provide one
        if std::env::var("PORTAL_API__BASE_URL").is_err() {
            let err = PortalConfig::load(Some(file.path())).unwrap_err();
            assert!(matches!(err, CoreError::InvalidConfig { .. }));
        }
    }
}
