//! Configuration management for wsgraph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `wsgraph.toml` file
//! 3. User config `~/.config/wsgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace layout configuration.
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./wsgraph.toml` (project local)
    /// 2. `~/.config/wsgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(LOCAL_CONFIG_FILE).exists() {
            return Self::from_file(LOCAL_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("WSGRAPH_ROOT") {
            self.workspace.root = PathBuf::from(root);
        }
        if let Ok(dir) = std::env::var("WSGRAPH_MODELS_DIR") {
            self.workspace.models_dir = dir;
        }
        if let Ok(facet) = std::env::var("WSGRAPH_MIDDLEWARE_FACET") {
            self.workspace.middleware_facet = facet;
        }
    }

    /// Rejects layouts the store cannot address.
    fn validate(&self) -> Result<(), ConfigError> {
        let ws = &self.workspace;
        if ws.models_dir.is_empty() || ws.models_dir.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "models_dir must be a single directory name, got '{}'",
                ws.models_dir
            )));
        }
        if ws.middleware_facet.is_empty() {
            return Err(ConfigError::Invalid(
                "middleware_facet must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Workspace layout configuration.
///
/// Names the files the store reads and writes, relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root directory.
    pub root: PathBuf,

    /// Subdirectory of each facet holding model files.
    pub models_dir: String,

    /// Facet configuration file name.
    pub facet_file: String,

    /// Model configuration file name.
    pub model_config_file: String,

    /// Datasource configuration file name.
    pub data_sources_file: String,

    /// Middleware configuration file name.
    pub middleware_file: String,

    /// Facet whose directory holds the middleware file.
    pub middleware_facet: String,

    /// Package definition file name.
    pub package_file: String,

    /// Directories skipped while scanning the workspace.
    pub exclude_dirs: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            models_dir: DEFAULT_MODELS_DIR.to_string(),
            facet_file: DEFAULT_FACET_FILE.to_string(),
            model_config_file: DEFAULT_MODEL_CONFIG_FILE.to_string(),
            data_sources_file: DEFAULT_DATA_SOURCES_FILE.to_string(),
            middleware_file: DEFAULT_MIDDLEWARE_FILE.to_string(),
            middleware_facet: DEFAULT_MIDDLEWARE_FACET.to_string(),
            package_file: DEFAULT_PACKAGE_FILE.to_string(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WorkspaceConfig {
    /// Creates a layout with default file names rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workspace.models_dir, DEFAULT_MODELS_DIR);
        assert_eq!(config.workspace.middleware_facet, DEFAULT_MIDDLEWARE_FACET);
        assert_eq!(config.workspace.root, PathBuf::from("."));
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[workspace]"));
        assert!(toml_str.contains("models_dir"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[workspace]
root = "/srv/app"
models_dir = "schemas"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workspace.root, PathBuf::from("/srv/app"));
        assert_eq!(config.workspace.models_dir, "schemas");
        assert_eq!(config.workspace.model_config_file, DEFAULT_MODEL_CONFIG_FILE);
    }

    #[test]
    fn test_validate_rejects_nested_models_dir() {
        let mut config = Config::default();
        config.workspace.models_dir = "a/b".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
