//! Shared session state
//!
//! A single process-wide observable value holding the signed-in user. There is
//! exactly one [`SessionWriter`] (owned by the session controller) and any
//! number of [`SessionHandle`] readers. Every write replaces the whole value,
//! so readers never see a half-applied session.

use crate::ability::PermissionSet;
use crate::user::UserProfile;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// The in-memory representation of the authenticated user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub display_name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub permissions: PermissionSet,
    pub access_token: String,
}

impl UserSession {
    /// Build a session from a backend profile and the issued access token
    pub fn from_profile(profile: &UserProfile, access_token: impl Into<String>) -> Self {
        Self {
            user_id: profile.user_id(),
            display_name: profile.display_name(),
            role: profile.role.clone(),
            email: profile.email.clone(),
            permissions: profile.ability.clone(),
            access_token: access_token.into(),
        }
    }

    /// Whether the session grants `action` on `subject`
    pub fn can(&self, action: &str, subject: &str) -> bool {
        self.permissions.can(action, subject)
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("email", &self.email)
            .field("permissions", &self.permissions)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Constructor for the writer/reader pair
pub struct SessionState;

impl SessionState {
    /// Create an empty session state
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (SessionWriter, SessionHandle) {
        let (tx, rx) = watch::channel(None);
        (SessionWriter { tx }, SessionHandle { rx })
    }
}

/// The only mutation path for the shared session
#[derive(Debug)]
pub struct SessionWriter {
    tx: watch::Sender<Option<UserSession>>,
}

impl SessionWriter {
    /// Replace the current session wholesale
    pub fn set_session(&self, session: UserSession) {
        self.tx.send_replace(Some(session));
    }

    /// Drop the current session
    pub fn clear_session(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }

    /// Replace the permission set of the current session
    ///
    /// Returns `false` when nobody is signed in.
    pub fn update_permissions(&self, permissions: PermissionSet) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(session) => {
                session.permissions = permissions;
                true
            }
            None => false,
        })
    }

    /// Replace the access token of the current session after a refresh
    ///
    /// Returns `false` when nobody is signed in.
    pub fn update_access_token(&self, access_token: &str) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(session) => {
                access_token.clone_into(&mut session.access_token);
                true
            }
            None => false,
        })
    }

    /// Current value as seen by the writer
    pub fn current_session(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }

    /// A new reader handle
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the shared session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<UserSession>>,
}

impl SessionHandle {
    /// Snapshot of the current session
    pub fn current_session(&self) -> Option<UserSession> {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        let mut rx = self.rx.clone();
        rx.mark_unchanged();
        rx
    }
}
