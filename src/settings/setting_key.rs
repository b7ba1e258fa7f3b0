use std::fmt::{Display, Formatter};

use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;

/// Keys under which the blocker persists its settings.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum SettingKey {
    /// Comma-separated IDs of the pages to protect.
    ProtectedPages,
    /// Newline-separated blocklist.
    BlockedIps,
    /// HTML shown to blocked clients.
    BlockMessage,
    /// Where blocked clients are sent instead of seeing the message.
    RedirectUrl,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ProtectedPages,
        SettingKey::BlockedIps,
        SettingKey::BlockMessage,
        SettingKey::RedirectUrl,
    ];

    /// Stable name used in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ProtectedPages => "protected_pages",
            SettingKey::BlockedIps => "blocked_ips",
            SettingKey::BlockMessage => "block_message",
            SettingKey::RedirectUrl => "redirect_url",
        }
    }
}

impl Display for SettingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for SettingKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::types::{ToSqlOutput, ValueRef};
    use rusqlite::ToSql;

    use crate::SettingKey;

    #[test]
    fn test_setting_keys_names() {
        let names: Vec<&str> = SettingKey::ALL.iter().map(SettingKey::as_str).collect();
        assert_eq!(
            names,
            vec!["protected_pages", "blocked_ips", "block_message", "redirect_url"]
        );
        assert_eq!(SettingKey::BlockedIps.to_string(), "blocked_ips");
    }

    #[test]
    fn test_setting_keys_to_sql() {
        assert_eq!(
            SettingKey::to_sql(&SettingKey::RedirectUrl),
            Ok(ToSqlOutput::Borrowed(ValueRef::Text(b"redirect_url")))
        );
    }
}
