//! GSettings Backend
//!
//! Stores settings in dconf through `gio::Settings`. Changes made by other
//! processes (the shell, `gsettings set`) arrive as `changed` signals on the
//! main loop.

use gtk::gio;
use gtk::prelude::*;
use shellprefs_common::error::StoreError;
use shellprefs_common::schema::{Schema, SettingValue};
use shellprefs_common::store::SettingsBackend;
use shellprefs_common::Subscription;
use std::rc::Rc;
use tracing::{debug, info};

pub struct GSettingsBackend {
    settings: gio::Settings,
}

impl GSettingsBackend {
    /// Open `schema_id` from the installed schemas, checking that it
    /// declares every key of `schema`
    pub fn open(schema_id: &str, schema: &Schema) -> Result<Self, StoreError> {
        let source = gio::SettingsSchemaSource::default()
            .ok_or_else(|| StoreError::SchemaNotInstalled(schema_id.to_string()))?;
        Self::open_in(&source, schema_id, schema, None)
    }

    /// Open `schema_id` from `source`, storing values in `storage` (the
    /// session default when `None`)
    pub fn open_in(
        source: &gio::SettingsSchemaSource,
        schema_id: &str,
        schema: &Schema,
        storage: Option<&gio::SettingsBackend>,
    ) -> Result<Self, StoreError> {
        let installed = source
            .lookup(schema_id, true)
            .ok_or_else(|| StoreError::SchemaNotInstalled(schema_id.to_string()))?;

        if let Some(spec) = schema.keys().find(|spec| !installed.has_key(spec.name)) {
            return Err(StoreError::MissingKey {
                schema: schema_id.to_string(),
                key: spec.name.to_string(),
            });
        }

        info!("Using GSettings schema {}", schema_id);
        Ok(Self {
            settings: gio::Settings::new_full(&installed, storage, None),
        })
    }

    /// Whether `schema_id` can be opened at all
    pub fn is_installed(schema_id: &str) -> bool {
        gio::SettingsSchemaSource::default()
            .and_then(|source| source.lookup(schema_id, true))
            .is_some()
    }
}

impl SettingsBackend for GSettingsBackend {
    fn name(&self) -> &'static str {
        "gsettings"
    }

    fn read(&self, key: &str) -> Result<Option<SettingValue>, StoreError> {
        let variant = self.settings.value(key);
        if let Some(value) = variant.get::<bool>() {
            return Ok(Some(SettingValue::Bool(value)));
        }
        if let Some(value) = variant.str() {
            return Ok(Some(SettingValue::from(value)));
        }

        debug!("'{}' has unsupported type {}", key, variant.type_());
        Ok(None)
    }

    fn write(&self, key: &str, value: &SettingValue) -> Result<(), StoreError> {
        let variant = match value {
            SettingValue::Bool(b) => b.to_variant(),
            SettingValue::Str(s) => s.to_variant(),
        };
        if self.settings.value(key) == variant {
            return Ok(());
        }

        self.settings
            .set_value(key, &variant)
            .map_err(|e| StoreError::Backend(format!("cannot write '{}': {}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.settings.reset(key);
        Ok(())
    }

    fn watch(&self, key: &str, callback: Rc<dyn Fn(&str)>) -> Subscription {
        let handler = self
            .settings
            .connect_changed(Some(key), move |_, changed| callback(changed));

        let settings = self.settings.downgrade();
        Subscription::new(move || {
            if let Some(settings) = settings.upgrade() {
                settings.disconnect(handler);
            }
        })
    }

    /// dconf writes are asynchronous; a short-lived process must wait for
    /// them before exiting
    fn flush(&self) -> Result<(), StoreError> {
        gio::Settings::sync();
        Ok(())
    }
}
