//! User profile as returned by the backend

use crate::ability::PermissionSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend user identifier, numeric or textual depending on the deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The `user` / `user_data` object of an authentication response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default, rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub ability: PermissionSet,
}

impl UserProfile {
    /// Name shown to the user after sign-in
    pub fn display_name(&self) -> String {
        if let Some(name) = non_blank(self.full_name.as_deref()) {
            return name.to_string();
        }

        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }

        non_blank(self.username.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .unwrap_or("John Doe")
            .to_string()
    }

    /// Identifier rendered as a string, falling back to username then email
    pub fn user_id(&self) -> String {
        self.id.as_ref().map_or_else(
            || {
                self.username
                    .clone()
                    .or_else(|| self.email.clone())
                    .unwrap_or_default()
            },
            ToString::to_string,
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
