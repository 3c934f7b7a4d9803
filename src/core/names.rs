//! Node Name Grammar
//!
//! Element and attribute names follow `[a-z][\w-]*`, case-insensitive,
//! where `\w` is the ASCII word class `[A-Za-z0-9_]`.

/// Check if a byte may start a name
#[inline]
pub fn is_name_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

/// Check if a byte may continue a name
#[inline]
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Check if a whole string is a legal node name
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) => is_name_start_byte(first) && rest.iter().all(|&b| is_name_byte(b)),
        None => false,
    }
}

/// Check if a string is all ASCII digits (and not empty)
#[inline]
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["a", "book", "Book", "first-name", "item_2", "X9"] {
            assert!(is_valid_name(name), "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1abc", "-a", "_a", "a b", "a.b", "a:b", "é", "@id", "a[1]"] {
            assert!(!is_valid_name(name), "{name}");
        }
    }

    #[test]
    fn test_numeric() {
        assert!(is_numeric("12"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("1a"));
    }
}
