//! Configuration Parser
//!
//! Parses `config.toml` for backend selection, page overrides and window
//! geometry. Every section is optional.

use crate::paths;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The main configuration structure matching config.toml
#[derive(Debug, Default, Deserialize)]
pub struct PrefsConfig {
    #[serde(default)]
    pub settings: StoreConfig,
    #[serde(default)]
    pub pages: PagesConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

/// Which settings backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GSettings when the schema is installed, otherwise the keyfile
    #[default]
    Auto,
    Gsettings,
    Keyfile,
    /// Nothing persisted
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "gsettings" => Ok(BackendKind::Gsettings),
            "keyfile" => Ok(BackendKind::Keyfile),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!(
                "unknown backend '{}' (expected auto, gsettings, keyfile or memory)",
                other
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Auto => "auto",
            BackendKind::Gsettings => "gsettings",
            BackendKind::Keyfile => "keyfile",
            BackendKind::Memory => "memory",
        })
    }
}

/// Settings store configuration
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// GSettings schema ID
    #[serde(default = "default_schema_id")]
    pub schema_id: String,

    /// Keyfile location (default: ~/.config/shellprefs/settings.toml)
    #[serde(default)]
    pub keyfile: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            schema_id: default_schema_id(),
            keyfile: None,
        }
    }
}

/// Page resource overrides
#[derive(Debug, Default, Deserialize)]
pub struct PagesConfig {
    /// Directory whose `<name>.ui` files replace the embedded pages
    #[serde(default)]
    pub dir: Option<String>,
}

/// Window geometry
#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: i32,

    #[serde(default = "default_height")]
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_schema_id() -> String {
    paths::SCHEMA_ID.to_string()
}

fn default_width() -> i32 {
    860
}

fn default_height() -> i32 {
    600
}

const MAX_DIMENSION: i32 = 16384;

impl PrefsConfig {
    /// Load configuration from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Failed to parse config.toml")
    }

    /// Load from an explicit path, or from the default location if it
    /// exists, or fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match paths::config_file() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading configuration from {:?}", path);
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Resolved keyfile location
    pub fn keyfile_path(&self) -> Option<PathBuf> {
        match self.settings.keyfile {
            Some(ref keyfile) => Some(paths::expand_home(keyfile)),
            None => paths::keyfile_path(),
        }
    }

    /// Resolved page override directory
    pub fn pages_dir(&self) -> Option<PathBuf> {
        self.pages.dir.as_deref().map(paths::expand_home)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.settings.schema_id.trim().is_empty() {
            anyhow::bail!("settings.schema_id must not be empty");
        }

        for (name, value) in [("width", self.window.width), ("height", self.window.height)] {
            if !(1..=MAX_DIMENSION).contains(&value) {
                anyhow::bail!(
                    "window.{} must be between 1 and {}, got: {}",
                    name,
                    MAX_DIMENSION,
                    value
                );
            }
        }

        if let Some(dir) = self.pages_dir() {
            if !dir.is_dir() {
                anyhow::bail!("Page override directory does not exist: {}", dir.display());
            }
        }

        Ok(())
    }
}

/// Generate a template config.toml file
pub fn generate_template() -> String {
    format!(
        r#"# Shell preferences configuration

[settings]
# auto | gsettings | keyfile | memory
backend = "auto"
schema_id = "{schema_id}"

# Optional: keyfile used when GSettings is unavailable
# keyfile = "~/.config/shellprefs/settings.toml"

[pages]
# Optional: directory of .ui files overriding the built-in pages
# dir = "~/.local/share/shellprefs/pages"

[window]
width = {width}
height = {height}
"#,
        schema_id = paths::SCHEMA_ID,
        width = default_width(),
        height = default_height(),
    )
}
