//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Device-management server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Test case table settings
    #[serde(default)]
    pub table: TableConfig,
}

/// Device-management server settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the server's REST API, without the `/clients` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

/// Test case table settings
#[derive(Debug, Deserialize, Default)]
pub struct TableConfig {
    /// YAML table to use instead of the built-in one
    ///
    /// Relative paths are resolved against the config file's directory.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let mut config = Self::from_toml_str(&content)?;

        if let (Some(table), Some(dir)) = (config.table.path.as_ref(), path.parent()) {
            if table.is_relative() {
                config.table.path = Some(dir.join(table));
            }
        }

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_leshan() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8080/api");
        assert!(config.table.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            base_url = "http://leshan.example:8080/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://leshan.example:8080/api");
        assert!(config.table.path.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[server\nbase_url = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_relative_table_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[table]\npath = \"custom.yaml\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.table.path, Some(dir.path().join("custom.yaml")));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = Config::load_from(Path::new("/nonexistent/lwm2m-trigger.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
