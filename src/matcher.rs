use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::utils::ipv4_cidr::Ipv4Cidr;
use crate::{Pattern, PatternList};

/// A [`PatternList`] compiled for repeated lookups.
///
/// Every line takes part in the exact-string comparison; valid IPv4 ranges are
/// additionally kept, in list order, for the masked comparison.
#[derive(Debug, Default)]
pub struct Matcher<'a> {
    exact: HashSet<&'a str>,
    ranges: Vec<Ipv4Cidr>,
}

impl<'a> Matcher<'a> {
    #[must_use]
    pub fn new(patterns: &'a PatternList) -> Self {
        let mut exact = HashSet::with_capacity(patterns.len());
        let mut ranges = Vec::new();
        for line in patterns.iter() {
            exact.insert(line);
            if let Pattern::Cidr(cidr) = Pattern::parse(line) {
                ranges.push(cidr);
            }
        }
        Self { exact, ranges }
    }

    /// Whether `client_ip` must be blocked.
    ///
    /// The address is first compared verbatim with every line, so IPv6 clients
    /// can only be blocked by an identical literal. IPv4 clients are then checked
    /// against each valid range until one contains them.
    /// Malformed ranges never match, and this never fails.
    #[must_use]
    pub fn evaluate(&self, client_ip: &str) -> bool {
        if client_ip.is_empty() {
            return false;
        }
        if self.exact.contains(client_ip) {
            return true;
        }
        match Ipv4Addr::from_str(client_ip) {
            Ok(client) => self.ranges.iter().any(|cidr| cidr.contains(client)),
            Err(_) => false,
        }
    }

    /// Number of valid IPv4 ranges in the compiled list.
    #[must_use]
    pub fn ranges(&self) -> usize {
        self.ranges.len()
    }
}

/// Whether `client_ip` is blocked by `patterns`.
///
/// # Examples
///
/// ```
/// use page_ip_blocker::{evaluate, PatternList};
///
/// let patterns = PatternList::normalize("192.168.1.0/24\n2001:db8::1");
/// assert!(evaluate("192.168.1.42", &patterns));
/// assert!(evaluate("2001:db8::1", &patterns));
/// assert!(!evaluate("192.168.2.1", &patterns));
/// ```
#[must_use]
pub fn evaluate(client_ip: &str, patterns: &PatternList) -> bool {
    Matcher::new(patterns).evaluate(client_ip)
}
