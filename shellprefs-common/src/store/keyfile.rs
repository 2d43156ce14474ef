//! TOML Keyfile Backend
//!
//! Persists settings as a flat TOML table, e.g.
//!
//! ```toml
//! color-scheme = "dark"
//! launch-at-login = true
//! ```
//!
//! Used when no GSettings schema is installed. Changes made by other
//! processes are picked up by [`KeyfileBackend::reload`].

use super::{KeyWatchers, SettingsBackend};
use crate::error::StoreError;
use crate::schema::SettingValue;
use crate::subscription::Subscription;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

type Values = BTreeMap<String, SettingValue>;

/// Settings stored in a TOML file
pub struct KeyfileBackend {
    path: PathBuf,
    values: RefCell<Values>,
    watchers: KeyWatchers,
}

impl KeyfileBackend {
    /// Open (or lazily create) the keyfile at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = read_values(&path)?;
        info!("Using settings keyfile {:?} ({} stored keys)", path, values.len());

        Ok(Self {
            path,
            values: RefCell::new(values),
            watchers: KeyWatchers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and notify every key whose value changed.
    ///
    /// Returns the changed keys.
    pub fn reload(&self) -> Result<Vec<String>, StoreError> {
        let fresh = read_values(&self.path)?;

        let changed: Vec<String> = {
            let current = self.values.borrow();
            let mut keys: Vec<&String> = current.keys().chain(fresh.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter()
                .filter(|key| current.get(*key) != fresh.get(*key))
                .cloned()
                .collect()
        };

        *self.values.borrow_mut() = fresh;
        if !changed.is_empty() {
            debug!("Keyfile reload changed {:?}", changed);
        }
        for key in &changed {
            self.watchers.notify(key);
        }

        Ok(changed)
    }

    /// Replace the file atomically so a concurrent reload never sees a
    /// partial write
    fn persist(&self, values: &Values) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        std::fs::create_dir_all(dir).map_err(io_error(dir))?;

        let contents = toml::to_string_pretty(values)?;
        let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        file.write_all(contents.as_bytes())
            .and_then(|_| file.as_file().sync_all())
            .map_err(io_error(file.path()))?;
        file.persist(&self.path)
            .map_err(|e| io_error(&self.path)(e.error))?;
        Ok(())
    }

    fn update(&self, key: &str, value: Option<&SettingValue>) -> Result<(), StoreError> {
        let mut next = self.values.borrow().clone();
        let changed = match value {
            Some(value) => next.insert(key.to_string(), value.clone()).as_ref() != Some(value),
            None => next.remove(key).is_some(),
        };
        if !changed {
            return Ok(());
        }

        self.persist(&next)?;
        *self.values.borrow_mut() = next;
        self.watchers.notify(key);
        Ok(())
    }
}

impl SettingsBackend for KeyfileBackend {
    fn name(&self) -> &'static str {
        "keyfile"
    }

    fn read(&self, key: &str) -> Result<Option<SettingValue>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &SettingValue) -> Result<(), StoreError> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(key, None)
    }

    fn watch(&self, key: &str, callback: Rc<dyn Fn(&str)>) -> Subscription {
        self.watchers.watch(key, callback)
    }
}

/// Parse the keyfile, skipping entries that are neither booleans nor strings
fn read_values(path: &Path) -> Result<Values, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Values::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let table: BTreeMap<String, toml::Value> =
        toml::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut values = Values::new();
    for (key, value) in table {
        match value {
            toml::Value::Boolean(b) => {
                values.insert(key, SettingValue::Bool(b));
            }
            toml::Value::String(s) => {
                values.insert(key, SettingValue::Str(s));
            }
            other => warn!("Skipping '{}' in {:?}: unsupported {}", key, path, other.type_str()),
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, COLOR_SCHEME, LAUNCH_AT_LOGIN};
    use crate::store::Settings;
    use std::cell::Cell;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = KeyfileBackend::open(dir.path().join("settings.toml")).unwrap();
        assert_eq!(backend.read(COLOR_SCHEME).unwrap(), None);
    }

    #[test]
    fn test_write_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = Settings::new(
            Rc::new(KeyfileBackend::open(&path).unwrap()),
            Schema::standard(),
        );
        settings.set_string(COLOR_SCHEME, "dark").unwrap();
        settings.set_bool(LAUNCH_AT_LOGIN, true).unwrap();

        let reopened = Settings::new(
            Rc::new(KeyfileBackend::open(&path).unwrap()),
            Schema::standard(),
        );
        assert_eq!(reopened.get_string(COLOR_SCHEME).unwrap(), "dark");
        assert!(reopened.get_bool(LAUNCH_AT_LOGIN).unwrap());
    }

    #[test]
    fn test_writes_replace_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "color-scheme = \"light\"\n").unwrap();

        let backend = KeyfileBackend::open(&path).unwrap();
        backend.write(COLOR_SCHEME, &SettingValue::from("dark")).unwrap();
        backend.write(LAUNCH_AT_LOGIN, &SettingValue::Bool(true)).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("settings.toml")]);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("color-scheme = \"dark\""));
        assert!(contents.contains("launch-at-login = true"));
    }

    #[test]
    fn test_unsupported_values_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "color-scheme = 5\nlaunch-at-login = true\n").unwrap();

        let backend = KeyfileBackend::open(&path).unwrap();
        assert_eq!(backend.read(COLOR_SCHEME).unwrap(), None);
        assert_eq!(
            backend.read(LAUNCH_AT_LOGIN).unwrap(),
            Some(SettingValue::Bool(true))
        );
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "color-scheme = [").unwrap();

        assert!(matches!(
            KeyfileBackend::open(&path),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_reload_notifies_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "color-scheme = \"light\"\n").unwrap();

        let backend = KeyfileBackend::open(&path).unwrap();
        let hits = Rc::new(Cell::new(0));
        let _sub = backend.watch(
            COLOR_SCHEME,
            Rc::new({
                let hits = hits.clone();
                move |_: &str| hits.set(hits.get() + 1)
            }),
        );

        std::fs::write(&path, "color-scheme = \"dark\"\n").unwrap();
        assert_eq!(backend.reload().unwrap(), vec![COLOR_SCHEME.to_string()]);
        assert_eq!(hits.get(), 1);
        assert_eq!(
            backend.read(COLOR_SCHEME).unwrap(),
            Some(SettingValue::from("dark"))
        );

        assert!(backend.reload().unwrap().is_empty());
        assert_eq!(hits.get(), 1);
    }
}
