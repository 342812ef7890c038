//! Token store
//!
//! Persists the access and refresh tokens under the fixed [`StorageKeys`]
//! names. Operations are synchronous and last-write-wins.

use crate::config::StorageKeys;
use crate::error::CoreResult;
use crate::storage::KeyValueStorage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Access and refresh token issued together on sign-in
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Whatever is currently persisted; both fields are `None` if never set
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    /// Both tokens, if both are present
    pub fn pair(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Reads and writes the persisted token pair
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persist both tokens, overwriting any prior values
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn save(&self, tokens: &TokenPair) -> CoreResult<()> {
        self.storage
            .set_item(StorageKeys::ACCESS_TOKEN, &tokens.access_token)?;
        self.storage
            .set_item(StorageKeys::REFRESH_TOKEN, &tokens.refresh_token)
    }

    /// Currently stored tokens
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn read(&self) -> CoreResult<StoredTokens> {
        Ok(StoredTokens {
            access_token: self.storage.get_item(StorageKeys::ACCESS_TOKEN)?,
            refresh_token: self.storage.get_item(StorageKeys::REFRESH_TOKEN)?,
        })
    }

    /// Replace only the access token, as a refresh does
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn replace_access_token(&self, access_token: &str) -> CoreResult<()> {
        self.storage
            .set_item(StorageKeys::ACCESS_TOKEN, access_token)
    }

    /// Delete both tokens; clearing an empty store is fine
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn clear(&self) -> CoreResult<()> {
        self.storage.remove_item(StorageKeys::ACCESS_TOKEN)?;
        self.storage.remove_item(StorageKeys::REFRESH_TOKEN)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
