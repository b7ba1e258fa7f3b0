mod memory_store;
mod setting_key;
mod sqlite_store;

pub use memory_store::MemoryStore;
pub use setting_key::SettingKey;
pub use sqlite_store::SqliteStore;

use crate::BlockerError;

/// Key-value persistence used by [`IpBlocker`](crate::IpBlocker).
///
/// Every value is a whole text blob: a `set` replaces it entirely and the
/// last write wins.
pub trait SettingsStore {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the underlying storage can't be read.
    fn get(&self, key: SettingKey) -> Result<Option<String>, BlockerError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the underlying storage can't be written.
    fn set(&self, key: SettingKey, value: &str) -> Result<(), BlockerError>;

    /// Stores `value` only if nothing is stored under `key` yet.
    ///
    /// Returns whether the value was written.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the underlying storage fails.
    fn add(&self, key: SettingKey, value: &str) -> Result<bool, BlockerError> {
        if self.get(key)?.is_some() {
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }
}
