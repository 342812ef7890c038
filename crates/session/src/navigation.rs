//! Navigation side effect of a session transition

use tracing::info;

/// Reacts to a completed transition by moving the UI to `route`
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for surfaces without a router; records the target in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigating");
    }
}
