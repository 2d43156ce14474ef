//! In-process settings backend

use super::{KeyWatchers, SettingsBackend};
use crate::error::StoreError;
use crate::schema::SettingValue;
use crate::subscription::Subscription;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Values held in memory for the life of the process
#[derive(Default)]
pub struct MemoryBackend {
    values: RefCell<BTreeMap<String, SettingValue>>,
    watchers: KeyWatchers,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated backend
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, SettingValue)>,
        K: Into<String>,
    {
        let backend = Self::new();
        backend
            .values
            .borrow_mut()
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        backend
    }
}

impl SettingsBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<SettingValue>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &SettingValue) -> Result<(), StoreError> {
        let changed = {
            let mut values = self.values.borrow_mut();
            if values.get(key) == Some(value) {
                false
            } else {
                values.insert(key.to_string(), value.clone());
                true
            }
        };

        if changed {
            self.watchers.notify(key);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = self.values.borrow_mut().remove(key).is_some();
        if removed {
            self.watchers.notify(key);
        }
        Ok(())
    }

    fn watch(&self, key: &str, callback: Rc<dyn Fn(&str)>) -> Subscription {
        self.watchers.watch(key, callback)
    }
}
