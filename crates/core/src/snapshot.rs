//! Persisted copy of the signed-in user, used to re-hydrate a session on startup

use crate::config::StorageKeys;
use crate::error::CoreResult;
use crate::session::UserSession;
use crate::storage::KeyValueStorage;
use std::sync::Arc;
use tracing::warn;

/// Persists a [`UserSession`] under the `userData` key
#[derive(Clone)]
pub struct SessionSnapshotStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionSnapshotStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn save(&self, session: &UserSession) -> CoreResult<()> {
        let serialized = serde_json::to_string(session)?;
        self.storage.set_item(StorageKeys::USER_DATA, &serialized)
    }

    /// Stored session, `None` when absent or unreadable
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn load(&self) -> CoreResult<Option<UserSession>> {
        let Some(stored) = self.storage.get_item(StorageKeys::USER_DATA)? else {
            return Ok(None);
        };
        match serde_json::from_str(&stored) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Ignoring unreadable session snapshot: {e}");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the storage is unavailable
    pub fn clear(&self) -> CoreResult<()> {
        self.storage.remove_item(StorageKeys::USER_DATA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::PermissionSet;
    use crate::storage::MemoryStorage;

    #[test]
    fn save_load_clear() {
        let store = SessionSnapshotStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.load().unwrap(), None);

        let session = UserSession {
            user_id: "1".into(),
            display_name: "John Doe".into(),
            role: Some("admin".into()),
            email: None,
            permissions: PermissionSet::default(),
            access_token: "T1".into(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_snapshot_reads_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(StorageKeys::USER_DATA, "{oops").unwrap();
        let store = SessionSnapshotStore::new(storage);
        assert_eq!(store.load().unwrap(), None);
    }
}
