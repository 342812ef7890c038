//! Portal core types and utilities
//!
//! Holds everything the session lifecycle needs that is not HTTP: the user and
//! session data model, durable key-value storage with the token store built on
//! top of it, the observable shared session state, permissions, configuration
//! and logging initialisation.

pub mod ability;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod snapshot;
pub mod state_dir;
pub mod storage;
pub mod tokens;
pub mod user;

pub use ability::{AbilityRule, PermissionSet};
pub use config::{PortalConfig, StorageKeys};
pub use error::{CoreError, CoreResult};
pub use session::{SessionHandle, SessionState, SessionWriter, UserSession};
pub use snapshot::SessionSnapshotStore;
pub use state_dir::StateDir;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use tokens::{StoredTokens, TokenPair, TokenStore};
pub use user::{UserId, UserProfile};
