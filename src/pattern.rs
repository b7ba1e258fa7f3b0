use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use crate::utils::ipv4_cidr::{CidrParseError, Ipv4Cidr};
use crate::PatternError;

/// A single blocklist entry, parsed from one line of the list.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Pattern {
    /// Address literal, compared verbatim with the client address.
    Exact(String),
    /// IPv4 range matched under its netmask.
    Cidr(Ipv4Cidr),
    /// Range that can never match (bad subnet, bad prefix or IPv6 subnet).
    Inert(String),
}

impl Pattern {
    const RANGE_SEPARATOR: char = '/';

    /// Classifies a normalized line.
    ///
    /// Never fails: malformed ranges become [`Pattern::Inert`].
    #[must_use]
    pub fn parse(line: &str) -> Self {
        if line.contains(Self::RANGE_SEPARATOR) {
            match Ipv4Cidr::from_str(line) {
                Ok(cidr) => Self::Cidr(cidr),
                Err(_) => Self::Inert(line.to_owned()),
            }
        } else {
            Self::Exact(line.to_owned())
        }
    }

    /// Classifies a trimmed, non-empty line and explains why it would never match.
    pub(crate) fn check(l: usize, line: &str) -> Result<Self, PatternError> {
        if !Self::has_valid_characters(line) {
            return Err(PatternError::InvalidCharacters(l, line.to_owned()));
        }

        let err = match Ipv4Cidr::from_str(line) {
            Ok(cidr) => return Ok(Self::Cidr(cidr)),
            Err(CidrParseError::MissingSeparator) => {
                return if IpAddr::from_str(line).is_ok() {
                    Ok(Self::Exact(line.to_owned()))
                } else {
                    Err(PatternError::InvalidAddress(l, line.to_owned()))
                };
            }
            Err(CidrParseError::InvalidSubnet) => {
                PatternError::InvalidSubnet(l, line.to_owned())
            }
            Err(CidrParseError::InvalidPrefix) => {
                PatternError::InvalidPrefix(l, line.to_owned())
            }
        };

        let subnet = line.split(Self::RANGE_SEPARATOR).next().unwrap_or_default();
        if Ipv6Addr::from_str(subnet).is_ok() {
            Err(PatternError::UnsupportedIpv6Range(l, line.to_owned()))
        } else {
            Err(err)
        }
    }

    /// Whether a line only uses the characters allowed in the list: `[0-9a-fA-F:./]`.
    pub(crate) fn has_valid_characters(line: &str) -> bool {
        !line.is_empty()
            && line
                .bytes()
                .all(|b| b.is_ascii_hexdigit() || matches!(b, b':' | b'.' | b'/'))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::utils::ipv4_cidr::Ipv4Cidr;
    use crate::{Pattern, PatternError};

    #[test]
    fn test_parse_patterns() {
        assert_eq!(
            Pattern::parse("203.0.113.7"),
            Pattern::Exact("203.0.113.7".to_owned())
        );
        assert_eq!(
            Pattern::parse("2001:db8::1"),
            Pattern::Exact("2001:db8::1".to_owned())
        );
        assert_eq!(
            Pattern::parse("192.168.1.0/24"),
            Pattern::Cidr(Ipv4Cidr::from_str("192.168.1.0/24").unwrap())
        );
        assert_eq!(
            Pattern::parse("10.0.0.0/99"),
            Pattern::Inert("10.0.0.0/99".to_owned())
        );
        assert_eq!(
            Pattern::parse("2001:db8::/32"),
            Pattern::Inert("2001:db8::/32".to_owned())
        );
        // anything without a separator is compared verbatim, valid or not
        assert_eq!(Pattern::parse("abc"), Pattern::Exact("abc".to_owned()));
    }

    #[test]
    fn test_check_patterns() {
        assert_eq!(
            Pattern::check(1, "1.1.1.1"),
            Ok(Pattern::Exact("1.1.1.1".to_owned()))
        );
        assert_eq!(
            Pattern::check(2, "10.0.0.0/8"),
            Ok(Pattern::Cidr(Ipv4Cidr::from_str("10.0.0.0/8").unwrap()))
        );
        assert_eq!(
            Pattern::check(3, "not an ip!"),
            Err(PatternError::InvalidCharacters(3, "not an ip!".to_owned()))
        );
        assert_eq!(
            Pattern::check(4, "abc"),
            Err(PatternError::InvalidAddress(4, "abc".to_owned()))
        );
        assert_eq!(
            Pattern::check(5, "1.1.1/24"),
            Err(PatternError::InvalidSubnet(5, "1.1.1/24".to_owned()))
        );
        assert_eq!(
            Pattern::check(6, "10.0.0.0/33"),
            Err(PatternError::InvalidPrefix(6, "10.0.0.0/33".to_owned()))
        );
        assert_eq!(
            Pattern::check(7, "fe80::/10"),
            Err(PatternError::UnsupportedIpv6Range(7, "fe80::/10".to_owned()))
        );
    }

    #[test]
    fn test_valid_characters() {
        assert!(Pattern::has_valid_characters("192.168.1.0/24"));
        assert!(Pattern::has_valid_characters("2001:DB8::aBc"));
        assert!(!Pattern::has_valid_characters(""));
        assert!(!Pattern::has_valid_characters("1.1.1.1 "));
        assert!(!Pattern::has_valid_characters("10.0.0.1-10.0.0.9"));
        assert!(!Pattern::has_valid_characters("localhost"));
    }
}
