use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use rusqlite::Connection;

use crate::logs::log_entry::LogEntry;
use crate::BlockerError;

pub(crate) struct Logger {
    path: PathBuf,
    db: Option<Connection>,
    batch: Vec<LogEntry>,
    batch_size: usize,
    #[cfg(test)]
    console_entries: u128,
}

// blocked requests are rare compared to packets, keep batches small
const BATCH_SIZE: usize = 10;

#[cfg(not(test))]
pub(crate) const SQLITE_PATH: &str = "./blocked.sqlite";
#[cfg(test)]
pub(crate) const SQLITE_PATH: &str = "./test_blocked.sqlite";

impl Logger {
    pub(crate) fn new(path: PathBuf) -> Logger {
        Logger {
            path,
            db: None,
            batch: Vec::new(),
            batch_size: BATCH_SIZE,
            #[cfg(test)]
            console_entries: 0,
        }
    }

    /// Opens the database on first use, so that console-only logging never touches disk.
    fn db(&mut self) -> Result<&mut Connection, BlockerError> {
        let db = match self.db.take() {
            Some(db) => db,
            None => {
                let db = Connection::open(&self.path)?;
                db.execute(
                    "CREATE TABLE IF NOT EXISTS blocked_requests (
                id        INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                client    TEXT NOT NULL,
                outcome   TEXT NOT NULL,
                redirect  TEXT
            )",
                    (),
                )?;
                db
            }
        };
        Ok(self.db.insert(db))
    }

    fn log_entry(&mut self, log_entry: LogEntry) {
        if log_entry.log_level.to_console() {
            log::info!("blocked request: {log_entry}");
            #[cfg(test)]
            {
                self.console_entries += 1;
            }
        }
        if log_entry.log_level.to_db() {
            self.store_entry(log_entry);
        }
    }

    fn store_entry(&mut self, log_entry: LogEntry) {
        self.batch.push(log_entry);
        if self.batch.len() >= self.batch_size {
            // write the batch to the DB in a single transaction
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.store_batch() {
            log::error!("cannot store blocked requests: {e}");
        }
    }

    fn store_batch(&mut self) -> Result<(), BlockerError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        let transaction = self.db()?.transaction()?;
        for log_entry in &batch {
            transaction.execute(
                "INSERT INTO blocked_requests (timestamp, client, outcome, redirect)
                    VALUES (?1, ?2, ?3, ?4)",
                (
                    log_entry.formatted_timestamp(),
                    &log_entry.client,
                    &log_entry.outcome,
                    log_entry.redirect(),
                ),
            )?;
        }
        transaction.commit()?;
        Ok(())
    }
}

/// Logger thread body: runs until every sender is dropped, then flushes what's left.
pub(crate) fn log(rx: &Receiver<LogEntry>, path: PathBuf) {
    let mut logger = Logger::new(path);

    while let Ok(log_entry) = rx.recv() {
        logger.log_entry(log_entry);
    }
    logger.flush();
}
