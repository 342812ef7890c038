//! Shared fixtures for session controller tests

#![allow(dead_code)]

use portal_core::{KeyValueStorage, MemoryStorage, StorageKeys};
use portal_session::{Navigator, Notification, Notifier};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Navigator that remembers every route it was sent to
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// Notifier that remembers every notification
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}

pub fn admin_user() -> Value {
    json!({
        "id": 1,
        "fullName": "John Doe",
        "username": "johndoe",
        "email": "admin@portal.dev",
        "role": "admin",
        "ability": [{ "action": "manage", "subject": "all" }]
    })
}

pub fn client_user() -> Value {
    json!({
        "id": 2,
        "fullName": "Jane Roe",
        "username": "janeroe",
        "email": "client@portal.dev",
        "role": "client",
        "ability": [{ "action": "read", "subject": "acl" }]
    })
}

/// Storage already holding the tokens and snapshot of a signed-in admin
pub fn signed_in_storage() -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(StorageKeys::ACCESS_TOKEN, "OLD1").unwrap();
    storage.set_item(StorageKeys::REFRESH_TOKEN, "OLD2").unwrap();
    storage
        .set_item(
            StorageKeys::USER_DATA,
            &json!({
                "user_id": "1",
                "display_name": "John Doe",
                "role": "admin",
                "email": "admin@portal.dev",
                "permissions": [{ "action": "manage", "subject": "all" }],
                "access_token": "OLD1"
            })
            .to_string(),
        )
        .unwrap();
    storage
}
