//! Permission set used by the UI to gate features

use serde::{Deserialize, Serialize};

/// Action that matches every action
pub const ANY_ACTION: &str = "manage";

/// Subject that matches every subject
pub const ANY_SUBJECT: &str = "all";

/// A single granted `(action, subject)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityRule {
    pub action: String,
    pub subject: String,
}

impl AbilityRule {
    pub fn new(action: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
        }
    }

    fn matches(&self, action: &str, subject: &str) -> bool {
        (self.action == action || self.action == ANY_ACTION)
            && (self.subject == subject || self.subject == ANY_SUBJECT)
    }
}

/// The set of actions the current user may perform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    rules: Vec<AbilityRule>,
}

impl PermissionSet {
    pub fn new(rules: Vec<AbilityRule>) -> Self {
        Self { rules }
    }

    /// Whether any rule grants `action` on `subject`
    pub fn can(&self, action: &str, subject: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(action, subject))
    }

    pub fn rules(&self) -> &[AbilityRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<AbilityRule> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = AbilityRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
