use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, SecondsFormat};

use crate::{BlockOutcome, LogLevel};

/// A blocked request, as sent to the logger thread.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LogEntry {
    pub(crate) timestamp: DateTime<Local>,
    pub(crate) client: String,
    pub(crate) outcome: BlockOutcome,
    pub(crate) log_level: LogLevel,
}

impl LogEntry {
    pub(crate) fn new(client: &str, outcome: BlockOutcome, log_level: LogLevel) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            client: client.to_owned(),
            outcome,
            log_level,
        }
    }

    pub(crate) fn formatted_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub(crate) fn redirect(&self) -> Option<&str> {
        match &self.outcome {
            BlockOutcome::Redirect(url) => Some(url),
            _ => None,
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.formatted_timestamp(),
            self.client,
            self.outcome
        )
    }
}
