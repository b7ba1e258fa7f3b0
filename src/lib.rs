//! # page-ip-blocker
//! ### Keep selected IP addresses and IPv4 ranges away from selected web pages
//!
//! The blocklist is a plain list of lines, each one either an IP address
//! (compared verbatim with the client address) or an IPv4 CIDR range
//! such as `192.168.1.0/24`.
//! Lines that can't match anything are ignored instead of failing the check.
//!
//! Settings are read from a [`SettingsStore`] on every request, so changes made
//! through the administrative methods take effect immediately.

mod block_outcome;
mod blocker_error;
mod log_level;
mod logs;
mod matcher;
mod pattern;
mod pattern_error;
mod pattern_list;
mod protected_pages;
mod request;
mod settings;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use http::Response;

pub use crate::block_outcome::BlockOutcome;
pub use crate::blocker_error::BlockerError;
pub use crate::log_level::LogLevel;
use crate::logs::log_entry::LogEntry;
use crate::logs::logger::{self, SQLITE_PATH};
pub use crate::matcher::{evaluate, Matcher};
pub use crate::pattern::Pattern;
pub use crate::pattern_error::PatternError;
pub use crate::pattern_list::PatternList;
pub use crate::protected_pages::ProtectedPages;
pub use crate::request::{BlockRequest, PageRequest};
pub use crate::settings::{MemoryStore, SettingKey, SettingsStore, SqliteStore};
pub use crate::utils::ipv4_cidr::{CidrParseError, Ipv4Cidr};
use crate::utils::sanitize::{sanitize_html, sanitize_redirect_url};

/// Guards protected pages against the addresses listed in its settings.
///
/// # Examples
///
/// ```
/// use page_ip_blocker::{BlockOutcome, IpBlocker, MemoryStore, PageRequest};
///
/// let blocker = IpBlocker::new(MemoryStore::new());
/// blocker.activate().unwrap();
/// blocker.set_protected_pages(["42"]).unwrap();
/// blocker.add_patterns("203.0.113.7\n192.168.1.0/24").unwrap();
///
/// let request = PageRequest::new(Some(42), Some("192.168.1.10"));
/// assert!(blocker.check_request(&request).unwrap().is_blocked());
///
/// let request = PageRequest::new(Some(7), Some("192.168.1.10"));
/// assert_eq!(blocker.check_request(&request).unwrap(), BlockOutcome::Allow);
/// ```
pub struct IpBlocker<S: SettingsStore> {
    store: S,
    log_level: LogLevel,
    logger: Option<(Sender<LogEntry>, JoinHandle<()>)>,
}

impl<S: SettingsStore> IpBlocker<S> {
    /// Message shown to blocked clients until another one is configured.
    pub const DEFAULT_BLOCK_MESSAGE: &'static str =
        "Access denied. Your IP address has been blocked from viewing this page.";

    /// Instantiates a new [`IpBlocker`] on top of a settings store.
    ///
    /// A background thread is started to log blocked requests;
    /// it's stopped when the blocker is dropped.
    pub fn new(store: S) -> Self {
        let (tx, rx) = mpsc::channel();
        let logger = thread::Builder::new()
            .name("blocked-requests-logger".to_owned())
            .spawn(move || logger::log(&rx, PathBuf::from(SQLITE_PATH)));
        let logger = match logger {
            Ok(handle) => Some((tx, handle)),
            Err(e) => {
                log::warn!("blocked requests won't be logged: {e}");
                None
            }
        };

        Self {
            store,
            log_level: LogLevel::default(),
            logger,
        }
    }

    /// The underlying settings store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sets how blocked requests are logged.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Seeds every setting with its default value, leaving existing values untouched.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn activate(&self) -> Result<(), BlockerError> {
        for key in SettingKey::ALL {
            let default = match key {
                SettingKey::BlockMessage => Self::DEFAULT_BLOCK_MESSAGE,
                SettingKey::ProtectedPages | SettingKey::BlockedIps | SettingKey::RedirectUrl => "",
            };
            if self.store.add(key, default)? {
                log::debug!("setting '{key}' initialized");
            }
        }
        Ok(())
    }

    /// The stored blocklist, normalized.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn patterns(&self) -> Result<PatternList, BlockerError> {
        let raw = self.store.get(SettingKey::BlockedIps)?.unwrap_or_default();
        Ok(PatternList::normalize(&raw))
    }

    /// Merges new lines into the stored blocklist and persists the result.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn add_patterns(&self, raw: &str) -> Result<PatternList, BlockerError> {
        let existing = self.store.get(SettingKey::BlockedIps)?.unwrap_or_default();
        let merged = PatternList::merge(&existing, raw);
        self.store.set(SettingKey::BlockedIps, &merged.to_string())?;
        log::info!("blocklist updated, {} entries", merged.len());
        Ok(merged)
    }

    /// Merges the content of a text file into the stored blocklist.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the file can't be read or the settings store fails.
    pub fn import_patterns<P: AsRef<Path>>(&self, path: P) -> Result<PatternList, BlockerError> {
        let raw = std::fs::read_to_string(path)?;
        self.add_patterns(&raw)
    }

    /// Removes the given lines from the stored blocklist and persists the result.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn delete_patterns<I, T>(&self, entries: I) -> Result<PatternList, BlockerError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let remaining = self.patterns()?.delete(entries);
        self.store
            .set(SettingKey::BlockedIps, &remaining.to_string())?;
        log::info!("blocklist updated, {} entries", remaining.len());
        Ok(remaining)
    }

    /// Lists the lines of `raw` that would never block anyone.
    ///
    /// The list can be stored anyway: such lines are simply ignored when matching.
    #[must_use]
    pub fn validate_patterns(&self, raw: &str) -> Vec<PatternError> {
        PatternList::validate(raw)
    }

    /// The stored set of protected pages.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails
    /// or holds something other than page IDs.
    pub fn protected_pages(&self) -> Result<ProtectedPages, BlockerError> {
        match self.store.get(SettingKey::ProtectedPages)? {
            Some(value) => ProtectedPages::from_setting(&value),
            None => Ok(ProtectedPages::default()),
        }
    }

    /// Replaces the protected pages with the valid IDs among `raw`.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn set_protected_pages<I, T>(&self, raw: I) -> Result<ProtectedPages, BlockerError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let pages = ProtectedPages::sanitize(raw);
        self.store
            .set(SettingKey::ProtectedPages, &pages.to_string())?;
        Ok(pages)
    }

    /// The message shown to blocked clients, as safe HTML.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn block_message(&self) -> Result<String, BlockerError> {
        let message = self
            .store
            .get(SettingKey::BlockMessage)?
            .unwrap_or_else(|| Self::DEFAULT_BLOCK_MESSAGE.to_owned());
        Ok(sanitize_html(&message))
    }

    /// Stores the message shown to blocked clients, stripped of unsafe HTML.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn set_block_message(&self, message: &str) -> Result<String, BlockerError> {
        let message = sanitize_html(message);
        self.store.set(SettingKey::BlockMessage, &message)?;
        Ok(message)
    }

    /// The URL blocked clients are sent to, empty if they get the message instead.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn redirect_url(&self) -> Result<String, BlockerError> {
        let url = self.store.get(SettingKey::RedirectUrl)?.unwrap_or_default();
        Ok(sanitize_redirect_url(&url))
    }

    /// Stores the redirect URL; anything but an absolute `http(s)` URL is stored as empty.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn set_redirect_url(&self, url: &str) -> Result<String, BlockerError> {
        let url = sanitize_redirect_url(url);
        self.store.set(SettingKey::RedirectUrl, &url)?;
        Ok(url)
    }

    /// Decides what to do with a request.
    ///
    /// Requests for pages that aren't protected, without a client address,
    /// or checked against an empty blocklist are always allowed.
    /// A blocked client is redirected if a redirect URL is set and denied otherwise.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails.
    pub fn check_request<R: BlockRequest + ?Sized>(
        &self,
        request: &R,
    ) -> Result<BlockOutcome, BlockerError> {
        let pages = self.protected_pages()?;
        if pages.is_empty() || !request.targets_resource(&pages) {
            return Ok(BlockOutcome::Allow);
        }

        let client = match request.client_addr() {
            Some(client) if !client.is_empty() => client,
            _ => return Ok(BlockOutcome::Allow),
        };

        let patterns = self.patterns()?;
        if patterns.is_empty() || !patterns.matches(client) {
            log::debug!("{client} allowed on protected page");
            return Ok(BlockOutcome::Allow);
        }

        let redirect_url = self.redirect_url()?;
        let outcome = if redirect_url.is_empty() {
            BlockOutcome::Deny(self.block_message()?)
        } else {
            BlockOutcome::Redirect(redirect_url)
        };
        self.log_blocked(client, &outcome);
        Ok(outcome)
    }

    /// Like [`IpBlocker::check_request`], returning the HTTP response to send instead.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the settings store fails
    /// or the response can't be built.
    pub fn response_for<R: BlockRequest + ?Sized>(
        &self,
        request: &R,
    ) -> Result<Option<Response<String>>, BlockerError> {
        self.check_request(request)?.to_response()
    }

    fn log_blocked(&self, client: &str, outcome: &BlockOutcome) {
        if self.log_level == LogLevel::Off {
            return;
        }
        if let Some((tx, _)) = &self.logger {
            let entry = LogEntry::new(client, outcome.clone(), self.log_level);
            if tx.send(entry).is_err() {
                log::warn!("blocked requests logger is down");
            }
        }
    }
}

impl<S: SettingsStore> Drop for IpBlocker<S> {
    fn drop(&mut self) {
        if let Some((tx, handle)) = self.logger.take() {
            // closing the channel makes the logger flush and exit
            drop(tx);
            if handle.join().is_err() {
                log::error!("blocked requests logger panicked");
            }
        }
    }
}
