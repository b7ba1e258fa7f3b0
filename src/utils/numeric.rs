/// Longest leading part of `s` that reads as a decimal number.
///
/// That is an optional sign, digits with an optional fraction (`8`, `8.`, `8.5`, `.5`)
/// and an optional exponent (`1e1`, `1E+1`). Returns an empty string if `s` doesn't
/// start with a number.
pub(crate) fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits + frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    &s[..i]
}

/// Whether the whole of `s` is a decimal number, as described in [`numeric_prefix`].
pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && numeric_prefix(s).len() == s.len()
}

/// Integer part of a decimal number, truncated toward zero.
///
/// Values outside the `i64` range saturate.
pub(crate) fn truncate(number: &str) -> Option<i64> {
    if let Ok(n) = number.parse::<i64>() {
        return Some(n);
    }
    let n = number.parse::<f64>().ok().filter(|n| !n.is_nan())?;
    // float to int casts saturate
    #[allow(clippy::cast_possible_truncation)]
    let n = n.trunc() as i64;
    Some(n)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use crate::utils::numeric::{is_numeric, numeric_prefix, truncate};

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("24"), "24");
        assert_eq!(numeric_prefix("8.5"), "8.5");
        assert_eq!(numeric_prefix("8."), "8.");
        assert_eq!(numeric_prefix(".5"), ".5");
        assert_eq!(numeric_prefix("1e1"), "1e1");
        assert_eq!(numeric_prefix("1E+2x"), "1E+2");
        assert_eq!(numeric_prefix("-3"), "-3");
        assert_eq!(numeric_prefix("5abc"), "5");
        assert_eq!(numeric_prefix("1e"), "1");
        assert_eq!(numeric_prefix("1.2.3"), "1.2");
        assert_eq!(numeric_prefix("."), "");
        assert_eq!(numeric_prefix("-"), "");
        assert_eq!(numeric_prefix("abc"), "");
        assert_eq!(numeric_prefix(""), "");
    }

    #[test]
    fn test_is_numeric() {
        for s in ["0", "32", "8.0", "8.5", ".5", "8.", "1e1", "1e-1", "007"] {
            assert!(is_numeric(s), "{s}");
        }
        for s in ["", ".", "1e", "e1", "0x8", "8/8", "1.2.3", "a"] {
            assert!(!is_numeric(s), "{s}");
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("8"), Some(8));
        assert_eq!(truncate("8.9"), Some(8));
        assert_eq!(truncate(".5"), Some(0));
        assert_eq!(truncate("1e1"), Some(10));
        assert_eq!(truncate("-2.7"), Some(-2));
        assert_eq!(truncate("99999999999999999999"), Some(i64::MAX));
        assert_eq!(truncate("1e400"), Some(i64::MAX));
        assert_eq!(truncate(""), None);
    }
}
