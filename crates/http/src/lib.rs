//! Portal HTTP client
//!
//! Thin typed wrapper around the authentication backend: sign-in, sign-up,
//! token refresh, social token exchange and logout. One request per call; no
//! retries and no backoff.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{AuthenticatedPortalClient, PublicPortalClient, TypedClientBuilder};
pub use types::{AuthResponse, FieldErrors, LoginRequest, RefreshResponse, RegisterRequest, SocialProvider};
