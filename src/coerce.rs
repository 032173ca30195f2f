/// Policy applied when a numeric cell is absent, empty or not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Replace the value with `0` and keep going.
    #[default]
    FallbackToZero,
    /// Fail the file, reporting the row, field and raw text.
    Strict,
}

/// Parses the longest leading decimal number in `text`.
///
/// Leading whitespace is skipped and anything after the number is ignored,
/// so `"71.28%"` yields `71.28`. Text without a leading number, and numbers
/// that overflow to infinity, yield `None`.
///
/// # Examples
/// ```
/// use market_csv_ingest::coerce::parse_float_prefix;
/// assert_eq!(parse_float_prefix(" 1430.60"), Some(1430.60));
/// assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
/// assert_eq!(parse_float_prefix("n/a"), None);
/// ```
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the leading integer in `text`, truncating any fractional part
/// (`"12.9"` yields `12`).
pub fn parse_int_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits = count_digits(&bytes[end..]);
    if digits == 0 {
        return None;
    }
    end += digits;

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_float_prefix("1430.60"), Some(1430.60));
        assert_eq!(parse_float_prefix("-3.5"), Some(-3.5));
        assert_eq!(parse_float_prefix("+7"), Some(7.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("8026837"), Some(8026837.0));
    }

    #[test]
    fn test_prefix_rules() {
        assert_eq!(parse_float_prefix("  71.28"), Some(71.28));
        assert_eq!(parse_float_prefix("71.28%"), Some(71.28));
        assert_eq!(parse_float_prefix("12abc"), Some(12.0));
        assert_eq!(parse_float_prefix("1,234.5"), Some(1.0));
        assert_eq!(parse_float_prefix("2.5e2"), Some(250.0));
        assert_eq!(parse_float_prefix("2.5e"), Some(2.5));
        assert_eq!(parse_float_prefix("2.5e+"), Some(2.5));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("   "), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("NaN"), None);
        assert_eq!(parse_float_prefix("Infinity"), None);
        assert_eq!(parse_float_prefix("1e999"), None);
    }

    #[test]
    fn test_integer_prefix() {
        assert_eq!(parse_int_prefix("5721715"), Some(5721715.0));
        assert_eq!(parse_int_prefix("12.9"), Some(12.0));
        assert_eq!(parse_int_prefix(" -4x"), Some(-4.0));
        assert_eq!(parse_int_prefix(".9"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_default_policy_is_fallback() {
        assert_eq!(CoercionPolicy::default(), CoercionPolicy::FallbackToZero);
    }
}
