use std::fmt::{Display, Formatter};

/// Warning about a blocklist line that will never block anyone.
///
/// Produced by [`PatternList::validate`](crate::PatternList::validate) so that
/// administrators can be told about typos; the matcher itself silently ignores
/// such lines.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum PatternError {
    /// The line contains characters other than hex digits, `:`, `.` and `/`,
    /// so it's dropped from the list.
    InvalidCharacters(usize, String),
    /// The line is not a valid IPv4 or IPv6 address.
    InvalidAddress(usize, String),
    /// The part before `/` is not a valid IPv4 address.
    InvalidSubnet(usize, String),
    /// The part after `/` is not a number between 0 and 32 once truncated.
    InvalidPrefix(usize, String),
    /// IPv6 ranges are accepted in the list but never matched.
    UnsupportedIpv6Range(usize, String),
}

impl Display for PatternError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (l, err_info) = match self {
            PatternError::InvalidCharacters(l, line) => {
                (l, format!("'{line}' contains invalid characters"))
            }
            PatternError::InvalidAddress(l, line) => {
                (l, format!("'{line}' is not a valid IP address"))
            }
            PatternError::InvalidSubnet(l, line) => (
                l,
                format!("'{line}' doesn't start with a valid IPv4 subnet"),
            ),
            PatternError::InvalidPrefix(l, line) => (
                l,
                format!("'{line}' has a prefix length outside of 0-32"),
            ),
            PatternError::UnsupportedIpv6Range(l, line) => {
                (l, format!("'{line}' is an IPv6 range, which is not supported"))
            }
        };

        write!(f, "Pattern error at line {l} - {err_info}")
    }
}

impl std::error::Error for PatternError {}
