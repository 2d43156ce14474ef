//! Centralized Identifiers and Paths
//!
//! Application/schema identifiers, page resource paths and the XDG
//! locations of the configuration and keyfile.

use std::path::PathBuf;

/// Application ID
pub const APP_ID: &str = "io.github.tduarte.Settings";

/// GSettings schema ID
pub const SCHEMA_ID: &str = "io.github.tduarte.Settings";

/// Prefix of page resource paths
pub const RESOURCE_PREFIX: &str = "/io/github/tduarte/Settings/pages/";

/// Directory name under the XDG config dir
const CONFIG_DIR_NAME: &str = "shellprefs";

/// Resource path of a page definition (`general` -> `.../pages/general.ui`)
pub fn page_resource(name: &str) -> String {
    format!("{}{}.ui", RESOURCE_PREFIX, name)
}

/// File name part of a resource path
pub fn resource_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// ~/.config/shellprefs
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
}

/// ~/.config/shellprefs/config.toml
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// ~/.config/shellprefs/settings.toml
pub fn keyfile_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.toml"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
