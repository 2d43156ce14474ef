//! Error types shared by the settings and page model.

use std::path::PathBuf;

/// A settings key or value does not match the declared schema.
///
/// This is a packaging defect, not a runtime condition: callers treat it
/// as fatal during window construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Settings key '{0}' is not declared in the schema")]
    UnknownKey(String),

    #[error("Settings key '{key}' expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },
}

/// A page's UI definition could not be used.
///
/// Recovered locally: the page is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceLoadError {
    #[error("UI resource not found: {0}")]
    NotFound(String),

    #[error("UI resource {path} is malformed: {reason}")]
    Malformed { path: String, reason: String },

    #[error("UI resource {0} has no 'root' element")]
    MissingRoot(String),
}

/// The backing store could not be opened, read or written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Settings schema '{0}' is not installed")]
    SchemaNotInstalled(String),

    #[error("Installed schema '{schema}' does not declare key '{key}'")]
    MissingKey { schema: String, key: String },

    #[error("Settings backend error: {0}")]
    Backend(String),
}

/// Any failure of a settings operation
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
