use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::utils::numeric::{is_numeric, truncate};

/// An IPv4 subnet together with its prefix length (e.g. `192.168.1.0/24`).
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Ipv4Cidr {
    subnet: u32,
    prefix: u8,
}

/// Reason why a text could not be read as an IPv4 CIDR range.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum CidrParseError {
    /// The text has no `/` separator.
    MissingSeparator,
    /// The part before `/` is not an IPv4 address.
    InvalidSubnet,
    /// The part after `/` is not a number, or not in `[0, 32]` once truncated.
    InvalidPrefix,
}

impl Ipv4Cidr {
    const SEPARATOR: char = '/';
    const MAX_PREFIX: u8 = 32;

    /// Builds a range from a subnet address and a prefix length.
    ///
    /// Returns `None` if `prefix` is greater than 32.
    #[must_use]
    pub fn new(subnet: Ipv4Addr, prefix: u8) -> Option<Self> {
        (prefix <= Self::MAX_PREFIX).then_some(Self {
            subnet: u32::from(subnet),
            prefix,
        })
    }

    /// The 32-bit mask with the top `prefix` bits set.
    #[must_use]
    pub fn netmask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix))
        }
    }

    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    #[must_use]
    pub fn subnet(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.subnet)
    }

    /// Whether `addr` falls in this range once both are masked.
    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = self.netmask();
        u32::from(addr) & mask == self.subnet & mask
    }

    /// Any decimal number is accepted and truncated toward zero: `8.5` and `8.0` read as 8,
    /// `1e1` as 10, `.5` as 0.
    fn parse_prefix(s: &str) -> Option<u8> {
        if !is_numeric(s) {
            return None;
        }
        let prefix = truncate(s)?;
        u8::try_from(prefix)
            .ok()
            .filter(|p| *p <= Self::MAX_PREFIX)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subnet_str, prefix_str) = s
            .split_once(Self::SEPARATOR)
            .ok_or(CidrParseError::MissingSeparator)?;
        let prefix = Self::parse_prefix(prefix_str).ok_or(CidrParseError::InvalidPrefix)?;
        let subnet =
            Ipv4Addr::from_str(subnet_str).map_err(|_| CidrParseError::InvalidSubnet)?;
        Ok(Self {
            subnet: u32::from(subnet),
            prefix,
        })
    }
}

impl Display for Ipv4Cidr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subnet(), self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    use crate::utils::ipv4_cidr::{CidrParseError, Ipv4Cidr};

    #[test]
    fn test_parse_valid_ranges() {
        let cidr = Ipv4Cidr::from_str("192.168.1.0/24").unwrap();
        assert_eq!(cidr.subnet(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cidr.prefix(), 24);
        assert_eq!(cidr.netmask(), 0xFFFF_FF00);
        assert_eq!(cidr.to_string(), "192.168.1.0/24");

        assert_eq!(Ipv4Cidr::from_str("0.0.0.0/0").unwrap().netmask(), 0);
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.1/32").unwrap().netmask(),
            u32::MAX
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/1").unwrap().netmask(),
            0x8000_0000
        );
    }

    #[test]
    fn test_parse_invalid_ranges() {
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.1"),
            Err(CidrParseError::MissingSeparator)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/99"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/32.5e1"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/."),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/1e"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/-1"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/a"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/8/1"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0.0/99999999999999999999"),
            Err(CidrParseError::InvalidPrefix)
        );
        assert_eq!(
            Ipv4Cidr::from_str("2001:db8::/32"),
            Err(CidrParseError::InvalidSubnet)
        );
        assert_eq!(
            Ipv4Cidr::from_str("300.0.0.0/8"),
            Err(CidrParseError::InvalidSubnet)
        );
        assert_eq!(
            Ipv4Cidr::from_str("10.0.0/8"),
            Err(CidrParseError::InvalidSubnet)
        );
    }

    #[test]
    fn test_parse_decimal_prefixes() {
        for (prefix, expected) in [
            ("8.0", 8),
            ("8.5", 8),
            ("8.", 8),
            ("1e1", 10),
            ("32.9", 32),
            ("3.2e1", 32),
            ("010", 10),
            (".5", 0),
        ] {
            let cidr = Ipv4Cidr::from_str(&format!("10.0.0.0/{prefix}")).unwrap();
            assert_eq!(cidr.prefix(), expected, "{prefix}");
        }

        // truncated to 0: matches every client
        let everything = Ipv4Cidr::from_str("10.0.0.0/.5").unwrap();
        assert!(everything.contains(Ipv4Addr::new(99, 1, 2, 3)));
    }

    #[test]
    fn test_new_checks_prefix() {
        assert!(Ipv4Cidr::new(Ipv4Addr::new(10, 0, 0, 0), 8).is_some());
        assert!(Ipv4Cidr::new(Ipv4Addr::new(10, 0, 0, 0), 32).is_some());
        assert!(Ipv4Cidr::new(Ipv4Addr::new(10, 0, 0, 0), 33).is_none());
    }

    #[test]
    fn test_contains() {
        let cidr = Ipv4Cidr::from_str("192.168.1.0/24").unwrap();
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 1, 42)));
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 1, 255)));
        assert!(!cidr.contains(Ipv4Addr::new(192, 168, 2, 1)));

        // host bits of the subnet are masked away
        let cidr = Ipv4Cidr::from_str("192.168.1.77/24").unwrap();
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 1, 1)));

        let everything = Ipv4Cidr::from_str("1.2.3.4/0").unwrap();
        assert!(everything.contains(Ipv4Addr::new(255, 255, 255, 255)));
        assert!(everything.contains(Ipv4Addr::new(0, 0, 0, 0)));

        let single = Ipv4Cidr::from_str("8.8.8.8/32").unwrap();
        assert!(single.contains(Ipv4Addr::new(8, 8, 8, 8)));
        assert!(!single.contains(Ipv4Addr::new(8, 8, 8, 9)));
    }
}
