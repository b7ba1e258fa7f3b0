/// Logging strategy for blocked requests.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Default)]
pub enum LogLevel {
    /// Blocked requests won't be logged at all.
    Off,
    /// Blocked requests will be logged into a database.
    Db,
    /// Blocked requests will be logged through the `log` facade.
    #[default]
    Console,
    /// Blocked requests will be logged both in a database and through the `log` facade.
    All,
}

impl LogLevel {
    pub(crate) fn to_console(self) -> bool {
        matches!(self, LogLevel::Console | LogLevel::All)
    }

    pub(crate) fn to_db(self) -> bool {
        matches!(self, LogLevel::Db | LogLevel::All)
    }
}
