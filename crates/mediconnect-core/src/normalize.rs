//! Identifier and free-text normalization.
//!
//! CPF, phone, and CEP values arrive from forms with formatting characters
//! ("123.456.789-01", "(11) 99999-8888", "01310-100"). Storage and search
//! matching both operate on the digits-only form.

/// Keep only decimal digits, in their original order.
pub fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits-only form of an optional value; absent input yields the empty
/// string.
pub fn opt_digits(input: Option<&str>) -> String {
    input.map(digits).unwrap_or_default()
}

/// Trim a free-text field, collapsing empty input to absence.
pub fn clean(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Digits-only form of an optional identifier, absent when no digits remain.
pub fn clean_digits(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let stripped = digits(&value);
        if stripped.is_empty() {
            None
        } else {
            Some(stripped)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_strips_formatting() {
        assert_eq!(digits("123.456.789-01"), "12345678901");
        assert_eq!(digits("(11) 99999-8888"), "11999998888");
        assert_eq!(digits("01310-100"), "01310100");
        assert_eq!(digits("abc"), "");
        assert_eq!(digits(""), "");
    }

    #[test]
    fn test_digits_preserves_order() {
        assert_eq!(digits("1a2b3c"), "123");
        assert_eq!(digits("9 8 7"), "987");
    }

    #[test]
    fn test_opt_digits_absent_is_empty() {
        assert_eq!(opt_digits(None), "");
        assert_eq!(opt_digits(Some("12-34")), "1234");
    }

    #[test]
    fn test_clean_collapses_empty() {
        assert_eq!(clean(None), None);
        assert_eq!(clean(Some("".into())), None);
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(Some("  Ana  ".into())), Some("Ana".into()));
    }

    #[test]
    fn test_clean_digits() {
        assert_eq!(clean_digits(None), None);
        assert_eq!(clean_digits(Some("abc".into())), None);
        assert_eq!(
            clean_digits(Some("529.982.247-25".into())),
            Some("52998224725".into())
        );
    }
}
