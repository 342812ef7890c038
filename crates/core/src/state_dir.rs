//! Platform-specific state directory management

use crate::error::CoreResult;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Manages platform-specific application directories
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Create a new StateDir instance
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("dev", "Portal", "Portal");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Create a new StateDir with an override directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Use the override when given, the platform directories otherwise
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or_else(Self::new, Self::with_override)
    }

    /// Get the configuration directory
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./config"),
            |dirs| dirs.config_dir().to_path_buf(),
        )
    }

    /// Get the data directory for persistent storage
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./data"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    /// File holding persisted tokens and the session snapshot
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir().join("storage.json")
    }

    /// Default configuration file location
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("portal.toml")
    }

    /// Create all required directories
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created
    pub fn create_directories(&self) -> CoreResult<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir)?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_directory() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        assert_eq!(state_dir.config_dir(), temp_dir.path().join("config"));
        assert_eq!(state_dir.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            state_dir.storage_path(),
            temp_dir.path().join("data").join("storage.json")
        );
    }

    #[test]
    fn test_create_directories() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::from_option(Some(temp_dir.path().to_path_buf()));

        state_dir.create_directories().unwrap();

        assert!(state_dir.config_dir().exists());
        assert!(state_dir.data_dir().exists());
    }
}
