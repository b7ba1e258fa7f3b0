use std::fmt::{Display, Formatter};

use crate::SettingKey;

/// Error that may arise while reading or writing the blocker settings.
///
/// Matching and list management never fail; only the storage boundary does.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum BlockerError {
    /// The settings store or the log database failed.
    Storage(String),
    /// A stored setting couldn't be read back.
    InvalidSetting(SettingKey, String),
    /// A pattern file couldn't be read.
    Io(String),
    /// The HTTP response for an outcome couldn't be built.
    Response(String),
}

impl Display for BlockerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let err_info = match self {
            BlockerError::Storage(reason) => format!("storage failure: {reason}"),
            BlockerError::InvalidSetting(key, value) => {
                format!("invalid value '{value}' stored for setting '{key}'")
            }
            BlockerError::Io(reason) => format!("cannot read patterns: {reason}"),
            BlockerError::Response(reason) => format!("cannot build response: {reason}"),
        };

        write!(f, "Blocker error - {err_info}")
    }
}

impl std::error::Error for BlockerError {}

impl From<rusqlite::Error> for BlockerError {
    fn from(err: rusqlite::Error) -> Self {
        BlockerError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for BlockerError {
    fn from(err: std::io::Error) -> Self {
        BlockerError::Io(err.to_string())
    }
}

impl From<http::Error> for BlockerError {
    fn from(err: http::Error) -> Self {
        BlockerError::Response(err.to_string())
    }
}
