//! Configuration paths

use std::path::PathBuf;

/// Name used for the configuration directory
const APP_NAME: &str = "lwm2m-trigger";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/lwm2m-trigger/`
/// - macOS: `~/Library/Application Support/lwm2m-trigger/`
/// - Windows: `%APPDATA%\lwm2m-trigger\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
