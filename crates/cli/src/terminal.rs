//! Terminal renditions of navigation and notifications

use portal_session::{Navigator, Notification, Notifier};
use tracing::debug;

/// Reports the route a browser session would land on
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        debug!(route, "Navigating");
        println!("-> {route}");
    }
}

/// Prints notifications as they would appear as toasts
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::SignedIn { .. } => println!("{notification}"),
            Notification::Error(_) => eprintln!("error: {notification}"),
        }
    }
}
