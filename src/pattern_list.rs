use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::matcher::Matcher;
use crate::{Pattern, PatternError};

/// Deduplicated, lexicographically sorted list of blocklist lines.
///
/// Lines are kept as the raw (trimmed) text entered by the administrator:
/// sorting is by string, not by numeric address, so `10.0.0.1` comes before `2.2.2.2`.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct PatternList {
    entries: Vec<String>,
}

impl PatternList {
    const LINE_SEPARATOR: char = '\n';
    /// Same set of characters trimmed by the admin forms.
    const TRIMMED: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

    /// Builds a list from raw, multi-line text.
    ///
    /// Lines can be separated by `\r\n`, `\r` or `\n`.
    /// Blank lines and lines with characters outside `[0-9a-fA-F:./]` are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_ip_blocker::PatternList;
    ///
    /// let list = PatternList::normalize("10.0.0.1\r\n2.2.2.2\n not an ip!\r10.0.0.1");
    /// assert_eq!(list.iter().collect::<Vec<_>>(), vec!["10.0.0.1", "2.2.2.2"]);
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self::from_lines(
            split_lines(raw)
                .map(Self::trim)
                .filter(|line| Pattern::has_valid_characters(line)),
        )
    }

    /// Union of two raw lists, each normalized on its own.
    #[must_use]
    pub fn merge(existing: &str, incoming: &str) -> Self {
        let existing = Self::normalize(existing);
        let incoming = Self::normalize(incoming);
        Self::from_lines(existing.iter().chain(incoming.iter()))
    }

    /// Returns a copy of this list without the given entries.
    ///
    /// Entries to remove are trimmed and must match exactly; unknown entries are ignored.
    #[must_use]
    pub fn delete<I, T>(&self, to_remove: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let to_remove: BTreeSet<String> = to_remove
            .into_iter()
            .map(|entry| Self::trim(entry.as_ref()).to_owned())
            .collect();
        Self::from_lines(self.iter().filter(|line| !to_remove.contains(*line)))
    }

    /// Lists the lines of raw input that will never block anyone.
    ///
    /// Line numbers start at 1 and count every line of `raw`, blank ones included.
    #[must_use]
    pub fn validate(raw: &str) -> Vec<PatternError> {
        split_lines(raw)
            .enumerate()
            .map(|(i, line)| (i + 1, Self::trim(line)))
            .filter(|(_, line)| !line.is_empty())
            .filter_map(|(l, line)| Pattern::check(l, line).err())
            .collect()
    }

    /// Whether `client_ip` is blocked by this list.
    #[must_use]
    pub fn matches(&self, client_ip: &str) -> bool {
        Matcher::new(self).evaluate(client_ip)
    }

    /// Iterates over the lines in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Iterates over the parsed entries in stored order.
    pub fn patterns(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.iter().map(Pattern::parse)
    }

    #[must_use]
    pub fn contains(&self, line: &str) -> bool {
        self.entries.binary_search_by(|e| e.as_str().cmp(line)).is_ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let set: BTreeSet<&str> = lines.collect();
        Self {
            entries: set.into_iter().map(str::to_owned).collect(),
        }
    }

    fn trim(line: &str) -> &str {
        line.trim_matches(&Self::TRIMMED[..])
    }
}

impl Display for PatternList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        for line in &self.entries {
            write!(f, "{sep}{line}")?;
            sep = "\n";
        }
        Ok(())
    }
}

/// Splits on `\r\n`, `\r` and `\n` alike.
fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(PatternList::LINE_SEPARATOR)
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}
