//! Request and response bodies of the authentication backend

use portal_core::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to server-provided message
pub type FieldErrors = BTreeMap<String, String>;

/// Sign-in request
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up request
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token refresh request
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Social provider token exchange request
#[derive(Serialize)]
pub(crate) struct SocialLoginRequest<'a> {
    pub access_token: &'a str,
}

/// Successful sign-in, sign-up, or social exchange
///
/// The profile arrives as `user_data` (sign-in) or `user` (sign-up, social);
/// `user_data` wins when both are present.
#[derive(Clone, Deserialize)]
#[serde(try_from = "RawAuthResponse")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct RawAuthResponse {
    #[serde(default, alias = "userData")]
    user_data: Option<UserProfile>,
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

impl TryFrom<RawAuthResponse> for AuthResponse {
    type Error = &'static str;

    fn try_from(raw: RawAuthResponse) -> Result<Self, Self::Error> {
        let user = raw
            .user_data
            .or(raw.user)
            .ok_or("missing field `user_data` or `user`")?;
        Ok(Self {
            user,
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
        })
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Successful token refresh
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse").finish_non_exhaustive()
    }
}

/// External identity provider whose token the backend can exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SocialProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            other => Err(format!("unknown social provider: {other}")),
        }
    }
}
