//! Settings Store Adapter
//!
//! [`Settings`] validates every access against the [`Schema`] and delegates
//! storage to a [`SettingsBackend`]. Backends own persistence and change
//! notification; the adapter adds defaults, type checks and bindings.

mod keyfile;
mod memory;

pub use keyfile::KeyfileBackend;
pub use memory::MemoryBackend;

use crate::controls::Toggle;
use crate::error::{SchemaError, SettingsError, StoreError};
use crate::schema::{Schema, SettingValue, ValueKind};
use crate::subscription::{Listeners, Subscription, Subscriptions};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Storage engine behind [`Settings`]
pub trait SettingsBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Stored value, or `None` when the key was never written
    fn read(&self, key: &str) -> Result<Option<SettingValue>, StoreError>;

    /// Store a value. Watchers of `key` are notified only if it changed.
    fn write(&self, key: &str, value: &SettingValue) -> Result<(), StoreError>;

    /// Drop the stored value so the schema default applies again
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Call `callback` with the key name after each change of `key`,
    /// whoever made it
    fn watch(&self, key: &str, callback: Rc<dyn Fn(&str)>) -> Subscription;

    /// Block until pending writes have reached permanent storage
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Direction(s) of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindFlags {
    /// Store changes update the control
    pub get: bool,
    /// Control changes update the store
    pub set: bool,
}

impl BindFlags {
    pub const DEFAULT: Self = Self { get: true, set: true };
    pub const GET: Self = Self { get: true, set: false };
    pub const SET: Self = Self { get: false, set: true };
}

impl Default for BindFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Handle to the settings store
#[derive(Clone)]
pub struct Settings {
    backend: Rc<dyn SettingsBackend>,
    schema: Rc<Schema>,
}

/// Non-owning [`Settings`] handle used inside callbacks
#[derive(Clone)]
pub struct WeakSettings {
    backend: Weak<dyn SettingsBackend>,
    schema: Rc<Schema>,
}

impl WeakSettings {
    pub fn upgrade(&self) -> Option<Settings> {
        self.backend.upgrade().map(|backend| Settings {
            backend,
            schema: self.schema.clone(),
        })
    }
}

impl Settings {
    pub fn new(backend: Rc<dyn SettingsBackend>, schema: Schema) -> Self {
        debug!("Opened settings store ({} backend)", backend.name());
        Self {
            backend,
            schema: Rc::new(schema),
        }
    }

    /// Standard schema over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryBackend::new()), Schema::standard())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn downgrade(&self) -> WeakSettings {
        WeakSettings {
            backend: Rc::downgrade(&self.backend),
            schema: self.schema.clone(),
        }
    }

    /// Current value of `key`, falling back to the schema default when the
    /// stored value is absent, unreadable or of the wrong type
    pub fn get(&self, key: &str) -> Result<SettingValue, SchemaError> {
        let spec = self.schema.lookup(key)?;

        match self.backend.read(key) {
            Ok(Some(value)) if spec.kind.accepts(&value) => Ok(value),
            Ok(Some(value)) => {
                warn!(
                    "Ignoring stored {} for '{}': expected a {} value",
                    value,
                    key,
                    spec.kind.describe()
                );
                Ok(spec.default.clone())
            }
            Ok(None) => Ok(spec.default.clone()),
            Err(e) => {
                warn!("Failed to read '{}': {}", key, e);
                Ok(spec.default.clone())
            }
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, SchemaError> {
        self.expect_kind(key, ValueKind::Bool)?;
        Ok(self.get(key)?.as_bool().unwrap_or_default())
    }

    pub fn get_string(&self, key: &str) -> Result<String, SchemaError> {
        let spec = self.schema.lookup(key)?;
        if !matches!(spec.kind, ValueKind::Enum(_)) {
            return Err(mismatch(key, "string"));
        }
        Ok(self.get(key)?.as_str().unwrap_or_default().to_string())
    }

    /// Store a value of the key's declared type
    pub fn set(&self, key: &str, value: impl Into<SettingValue>) -> Result<(), SettingsError> {
        let value = value.into();
        let spec = self.schema.lookup(key)?;
        if !spec.kind.accepts(&value) {
            return Err(mismatch(key, spec.kind.describe()).into());
        }

        self.backend.write(key, &value)?;
        debug!("Set '{}' = {}", key, value);
        Ok(())
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set(key, SettingValue::Bool(value))
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set(key, SettingValue::from(value))
    }

    /// Restore the schema default
    pub fn reset(&self, key: &str) -> Result<(), SettingsError> {
        self.schema.lookup(key)?;
        self.backend.remove(key)?;
        debug!("Reset '{}'", key);
        Ok(())
    }

    /// Wait for pending writes; call before the process exits
    pub fn flush(&self) -> Result<(), SettingsError> {
        self.backend.flush()?;
        Ok(())
    }

    /// Declared keys with their current values
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        self.schema
            .keys()
            .map(|spec| {
                let value = self.get(spec.name).unwrap_or_else(|_| spec.default.clone());
                (spec.name, value)
            })
            .collect()
    }

    /// Run `callback` after every change of `key`
    pub fn on_change(
        &self,
        key: &str,
        callback: impl Fn(&str) + 'static,
    ) -> Result<Subscription, SchemaError> {
        self.schema.lookup(key)?;
        Ok(self.backend.watch(key, Rc::new(callback)))
    }

    /// Link a boolean key to a toggle's `active` state.
    ///
    /// With [`BindFlags::DEFAULT`] the toggle takes the stored value
    /// immediately, follows later store changes, and writes user changes
    /// back. The link lasts until the returned handle is released or either
    /// side is dropped.
    pub fn bind(
        &self,
        key: &str,
        toggle: Rc<dyn Toggle>,
        flags: BindFlags,
    ) -> Result<Subscription, SchemaError> {
        self.expect_kind(key, ValueKind::Bool)?;
        let mut handles = Subscriptions::new();

        if flags.get {
            let stored = self.get_bool(key)?;
            if toggle.is_active() != stored {
                toggle.set_active(stored);
            }

            let settings = self.downgrade();
            let target = Rc::downgrade(&toggle);
            handles.push(self.backend.watch(
                key,
                Rc::new(move |changed: &str| {
                    let (Some(settings), Some(target)) = (settings.upgrade(), target.upgrade())
                    else {
                        return;
                    };
                    match settings.get_bool(changed) {
                        Ok(value) if target.is_active() != value => target.set_active(value),
                        Ok(_) => {}
                        Err(e) => warn!("Binding for '{}' lost: {}", changed, e),
                    }
                }),
            ));
        }

        if flags.set {
            let settings = self.downgrade();
            let key = key.to_string();
            handles.push(toggle.connect_toggled(Rc::new(move |active| {
                let Some(settings) = settings.upgrade() else {
                    return;
                };
                if settings.get_bool(&key).ok() == Some(active) {
                    return;
                }
                if let Err(e) = settings.set_bool(&key, active) {
                    warn!("Failed to store '{}': {}", key, e);
                }
            })));
        }

        debug!("Bound '{}' (get: {}, set: {})", key, flags.get, flags.set);
        Ok(Subscription::new(move || {
            drop(handles);
            drop(toggle);
        }))
    }

    fn expect_kind(&self, key: &str, kind: ValueKind) -> Result<(), SchemaError> {
        let spec = self.schema.lookup(key)?;
        if std::mem::discriminant(&spec.kind) != std::mem::discriminant(&kind) {
            return Err(mismatch(key, spec.kind.describe()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn mismatch(key: &str, expected: &'static str) -> SchemaError {
    SchemaError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

struct KeyWatcher {
    key: String,
    callback: Rc<dyn Fn(&str)>,
}

/// Per-key watcher list shared by the in-process backends
#[derive(Default)]
pub(crate) struct KeyWatchers {
    listeners: Listeners<KeyWatcher>,
}

impl KeyWatchers {
    pub(crate) fn watch(&self, key: &str, callback: Rc<dyn Fn(&str)>) -> Subscription {
        self.listeners.add(Rc::new(KeyWatcher {
            key: key.to_string(),
            callback,
        }))
    }

    pub(crate) fn notify(&self, key: &str) {
        for watcher in self.listeners.snapshot() {
            if watcher.key == key {
                (watcher.callback)(key);
            }
        }
    }
}
