//! One-shot user notifications (toasts)

use std::fmt;
use tracing::{info, warn};

/// Product name used in the sign-in greeting
pub const APP_NAME: &str = "Portal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Emitted once after every successful sign-in or sign-up
    SignedIn { name: String, role: String },
    /// A failure that has no form to attach to
    Error(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignedIn { name, role } => write!(
                f,
                "{name}: You have successfully logged in as an {role} user to {APP_NAME}. \
                 Now you can start to explore. Enjoy!"
            ),
            Self::Error(message) => f.write_str(message),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::SignedIn { .. } => info!("{notification}"),
            Notification::Error(_) => warn!("{notification}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_mentions_name_and_role() {
        let text = Notification::SignedIn {
            name: "John Doe".into(),
            role: "admin".into(),
        }
        .to_string();
        assert!(text.starts_with("John Doe: "));
        assert!(text.contains("as an admin user to Portal"));
    }
}
