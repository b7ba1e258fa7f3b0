use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::utils::numeric::{numeric_prefix, truncate};
use crate::{BlockerError, SettingKey};

/// IDs of the pages whose visitors go through the blocklist.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct ProtectedPages {
    ids: BTreeSet<u64>,
}

impl ProtectedPages {
    const SEPARATOR: char = ',';

    /// Builds the set from untrusted form values.
    ///
    /// Each value is read from its leading number, truncated toward zero, so `5abc` gives 5
    /// and `1.5` gives 1. Its absolute value is kept if positive; anything else is dropped.
    #[must_use]
    pub fn sanitize<I, T>(raw: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let ids = raw
            .into_iter()
            .filter_map(|value| truncate(numeric_prefix(value.as_ref().trim_start())))
            .map(i64::unsigned_abs)
            .filter(|id| *id > 0)
            .collect();
        Self { ids }
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Reads the comma-separated form written by [`Display`].
    pub(crate) fn from_setting(value: &str) -> Result<Self, BlockerError> {
        let mut ids = BTreeSet::new();
        for part in value.split(Self::SEPARATOR).filter(|p| !p.trim().is_empty()) {
            let id = part.trim().parse::<u64>().map_err(|_| {
                BlockerError::InvalidSetting(SettingKey::ProtectedPages, value.to_owned())
            })?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }
}

impl FromIterator<u64> for ProtectedPages {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().filter(|id| *id > 0).collect(),
        }
    }
}

impl Display for ProtectedPages {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        for id in &self.ids {
            write!(f, "{sep}{id}")?;
            sep = ",";
        }
        Ok(())
    }
}
