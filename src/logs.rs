pub(crate) mod log_entry;
pub(crate) mod logger;
