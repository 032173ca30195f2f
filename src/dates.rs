/// Date layouts found in exchange and index exports.
const TRADE_DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d", // 2025-05-14
    "%d-%m-%Y", // 14-05-2025
    "%m/%d/%Y", // 05/14/2025
    "%d-%b-%Y", // 14-May-2025
];

/// Parses a trade date in any of the supported export layouts.
///
/// # Arguments
/// * `text` - Date cell as it appears in the CSV. Surrounding whitespace is ignored.
///
/// # Returns
/// * `Option<chrono::NaiveDate>` - The calendar date, or `None` when no layout matches.
///
/// # Examples
/// ```
/// use market_csv_ingest::dates::parse_trade_date;
/// let d = parse_trade_date("14-May-2025").unwrap();
/// assert_eq!(d.to_string(), "2025-05-14");
/// ```
pub fn parse_trade_date(text: &str) -> Option<chrono::NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    TRADE_DATE_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(text, fmt).ok())
}

/// Orders two optional dates latest first, with unparseable dates last.
pub(crate) fn latest_first(a: Option<chrono::NaiveDate>, b: Option<chrono::NaiveDate>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_supported_layouts() {
        assert_eq!(parse_trade_date("2025-05-14"), Some(ymd(2025, 5, 14)));
        assert_eq!(parse_trade_date("14-05-2025"), Some(ymd(2025, 5, 14)));
        assert_eq!(parse_trade_date("05/14/2025"), Some(ymd(2025, 5, 14)));
        assert_eq!(parse_trade_date("14-May-2025"), Some(ymd(2025, 5, 14)));
        assert_eq!(parse_trade_date(" 02-Jan-2024 "), Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn test_unparseable_dates() {
        assert_eq!(parse_trade_date(""), None);
        assert_eq!(parse_trade_date("yesterday"), None);
        assert_eq!(parse_trade_date("31-02-2025"), None);
    }

    #[test]
    fn test_latest_first_ordering() {
        let mut dates = vec![
            None,
            Some(ymd(2025, 5, 12)),
            Some(ymd(2025, 5, 14)),
            Some(ymd(2025, 5, 13)),
        ];
        dates.sort_by(|a, b| latest_first(*a, *b));
        assert_eq!(
            dates,
            vec![
                Some(ymd(2025, 5, 14)),
                Some(ymd(2025, 5, 13)),
                Some(ymd(2025, 5, 12)),
                None
            ]
        );
    }
}
