use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{BlockerError, SettingKey, SettingsStore};

/// Settings kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<SettingKey, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<SettingKey, String>>, BlockerError> {
        self.values
            .lock()
            .map_err(|_| BlockerError::Storage("settings lock poisoned".to_owned()))
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: SettingKey) -> Result<Option<String>, BlockerError> {
        Ok(self.values()?.get(&key).cloned())
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), BlockerError> {
        self.values()?.insert(key, value.to_owned());
        Ok(())
    }
}
