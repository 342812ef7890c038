//! CLI configuration utilities

use anyhow::{Context, Result};
use portal_core::{PortalConfig, StateDir};
use std::path::PathBuf;
use tracing::debug;

/// Settings given on the command line that take precedence over files and env
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

/// Load configuration: explicit file, else `<config dir>/portal.toml` when it exists
pub fn load_config(overrides: &Overrides, state_dir: &StateDir) -> Result<PortalConfig> {
    let path = overrides.config.clone().or_else(|| {
        let default_path = state_dir.config_path();
        default_path.exists().then_some(default_path)
    });
    if let Some(path) = &path {
        debug!("Loading configuration from: {}", path.display());
    }

    let mut config = PortalConfig::layered(path.as_deref())
        .with_context(|| format!("Failed to load configuration from {path:?}"))?;

    if let Some(base_url) = &overrides.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level.clone_from(level);
    }
    config.validate()?;
    Ok(config)
}

/// Render the effective configuration
pub fn render_config(config: &PortalConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_and_flags_are_layered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"https://api.portal.dev\"").unwrap();
        writeln!(file, "[routes]\nclient_home = \"/acl\"").unwrap();

        let overrides = Overrides {
            config: Some(path),
            base_url: None,
            log_level: Some("debug".to_string()),
        };
        let config = load_config(&overrides, &StateDir::with_override(dir.path())).unwrap();

        assert_eq!(config.api.base_url, "https://api.portal.dev");
        assert_eq!(config.routes.client_home, "/acl");
        assert_eq!(config.routes.admin_home, "/");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn base_url_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            base_url: Some("http://localhost:3000".to_string()),
            ..Overrides::default()
        };
        let config = load_config(&overrides, &StateDir::with_override(dir.path())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");

        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("http://localhost:3000"));
    }
}
