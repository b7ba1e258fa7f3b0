use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::{BlockerError, SettingKey, SettingsStore};

/// Settings persisted in a SQLite database.
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the settings database at `path`.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the database can't be opened
    /// or the settings table can't be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlockerError> {
        let store = Self {
            db: Connection::open(path)?,
        };
        store.create_table()?;
        Ok(store)
    }

    /// Opens a database that lives only as long as the returned store.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if SQLite can't allocate the database.
    pub fn open_in_memory() -> Result<Self, BlockerError> {
        let store = Self {
            db: Connection::open_in_memory()?,
        };
        store.create_table()?;
        Ok(store)
    }

    fn create_table(&self) -> Result<(), BlockerError> {
        self.db.execute(
            "CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
            (),
        )?;
        Ok(())
    }
}

impl SettingsStore for SqliteStore {
    fn get(&self, key: SettingKey) -> Result<Option<String>, BlockerError> {
        let value = self
            .db
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                (&key,),
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), BlockerError> {
        self.db.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (&key, value),
        )?;
        Ok(())
    }
}
