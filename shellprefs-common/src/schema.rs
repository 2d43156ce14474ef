//! Settings Schema
//!
//! Declares the keys the preferences window reads and writes. The key names
//! and defaults are an external contract shared with the installed GSettings
//! schema (`data/io.github.tduarte.Settings.gschema.xml`).

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start the session's apps at login
pub const LAUNCH_AT_LOGIN: &str = "launch-at-login";

/// Show desktop notifications
pub const SHOW_NOTIFICATIONS: &str = "show-notifications";

/// Networking master toggle
pub const ENABLE_NETWORKING: &str = "enable-networking";

/// Color scheme: `system`, `light` or `dark`
pub const COLOR_SCHEME: &str = "color-scheme";

/// Choices of the `color-scheme` enum, in selector order
pub const COLOR_SCHEME_CHOICES: &[&str] = &["system", "light", "dark"];

/// A persisted setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Str(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(s) => Some(s),
            SettingValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

/// The type a key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    /// String restricted (informationally) to a set of choices
    Enum(&'static [&'static str]),
}

impl ValueKind {
    /// Whether `value` has the right shape for this kind.
    ///
    /// Enum choices are not enforced: an unknown string is still a string.
    pub fn accepts(&self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (ValueKind::Bool, SettingValue::Bool(_)) | (ValueKind::Enum(_), SettingValue::Str(_))
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Enum(_) => "string",
        }
    }
}

/// A declared key
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub default: SettingValue,
    pub summary: &'static str,
}

/// The set of declared keys
#[derive(Debug, Clone)]
pub struct Schema {
    keys: Vec<KeySpec>,
}

impl Schema {
    /// The schema shipped with the application
    pub fn standard() -> Self {
        Self {
            keys: vec![
                KeySpec {
                    name: LAUNCH_AT_LOGIN,
                    kind: ValueKind::Bool,
                    default: SettingValue::Bool(false),
                    summary: "Launch at login",
                },
                KeySpec {
                    name: SHOW_NOTIFICATIONS,
                    kind: ValueKind::Bool,
                    default: SettingValue::Bool(true),
                    summary: "Show notifications",
                },
                KeySpec {
                    name: ENABLE_NETWORKING,
                    kind: ValueKind::Bool,
                    default: SettingValue::Bool(true),
                    summary: "Enable networking",
                },
                KeySpec {
                    name: COLOR_SCHEME,
                    kind: ValueKind::Enum(COLOR_SCHEME_CHOICES),
                    default: SettingValue::Str("system".to_string()),
                    summary: "Color scheme",
                },
            ],
        }
    }

    /// Build a schema from an explicit key list
    pub fn new(keys: Vec<KeySpec>) -> Self {
        Self { keys }
    }

    /// Look up a declared key
    pub fn lookup(&self, key: &str) -> Result<&KeySpec, SchemaError> {
        self.keys
            .iter()
            .find(|spec| spec.name == key)
            .ok_or_else(|| SchemaError::UnknownKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|spec| spec.name == key)
    }

    /// Declared keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &KeySpec> {
        self.keys.iter()
    }

    /// Parse user text (CLI) into a value of the key's kind
    pub fn parse_value(&self, key: &str, text: &str) -> Result<SettingValue, SchemaError> {
        let spec = self.lookup(key)?;
        match spec.kind {
            ValueKind::Bool => match text.trim() {
                "true" => Ok(SettingValue::Bool(true)),
                "false" => Ok(SettingValue::Bool(false)),
                _ => Err(SchemaError::TypeMismatch {
                    key: key.to_string(),
                    expected: spec.kind.describe(),
                }),
            },
            ValueKind::Enum(_) => Ok(SettingValue::Str(text.trim().to_string())),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}
