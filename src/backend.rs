//! Settings backend selection
//!
//! Resolves the configured [`BackendKind`] to a concrete store. `auto`
//! prefers GSettings and falls back to the TOML keyfile when the schema is
//! not installed (running from a build tree, non-GNOME sessions).

use crate::gsettings::GSettingsBackend;
use anyhow::{Context, Result};
use shellprefs_common::config::{BackendKind, PrefsConfig};
use shellprefs_common::store::{KeyfileBackend, MemoryBackend};
use shellprefs_common::{Schema, Settings};
use std::rc::Rc;
use tracing::info;

/// An opened settings store
pub struct OpenedStore {
    pub settings: Settings,
    /// Set when the keyfile backend is in use; it needs explicit reloads
    pub keyfile: Option<Rc<KeyfileBackend>>,
}

/// Open the store selected by `kind`, or by the configuration when `None`
pub fn open_settings(config: &PrefsConfig, kind: Option<BackendKind>) -> Result<OpenedStore> {
    let schema = Schema::standard();
    let schema_id = config.settings.schema_id.as_str();

    let kind = match kind.unwrap_or(config.settings.backend) {
        BackendKind::Auto if GSettingsBackend::is_installed(schema_id) => BackendKind::Gsettings,
        BackendKind::Auto => {
            info!("Schema {} not installed, using keyfile", schema_id);
            BackendKind::Keyfile
        }
        other => other,
    };

    let opened = match kind {
        BackendKind::Gsettings => {
            let backend = GSettingsBackend::open(schema_id, &schema)?;
            OpenedStore {
                settings: Settings::new(Rc::new(backend), schema),
                keyfile: None,
            }
        }
        BackendKind::Keyfile | BackendKind::Auto => {
            let path = config
                .keyfile_path()
                .context("Cannot determine the settings keyfile location")?;
            let backend = Rc::new(KeyfileBackend::open(path)?);
            OpenedStore {
                settings: Settings::new(backend.clone(), schema),
                keyfile: Some(backend),
            }
        }
        BackendKind::Memory => OpenedStore {
            settings: Settings::new(Rc::new(MemoryBackend::new()), schema),
            keyfile: None,
        },
    };

    Ok(opened)
}
