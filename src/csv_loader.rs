use crate::error::CsvParseError;

/// Trimmed, de-duplicated header row shared by every record of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Headers {
    names: Vec<String>,
    positions: std::collections::HashMap<String, usize>,
}

impl Headers {
    /// Builds a header row from raw header cells.
    ///
    /// Names are trimmed and a leading byte-order mark is dropped. A name that
    /// repeats an earlier one is renamed `<name>_1`, `<name>_2`, ... so every
    /// column stays addressable.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut positions = std::collections::HashMap::new();

        for (i, cell) in raw.into_iter().enumerate() {
            let mut name = cell.as_ref();
            if i == 0 {
                name = name.trim_start_matches('\u{feff}');
            }
            let base = name.trim().to_string();

            let mut unique = base.clone();
            let mut suffix = 1;
            while positions.contains_key(&unique) {
                unique = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            positions.insert(unique.clone(), names.len());
            names.push(unique);
        }

        Headers { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One data row, keyed by header name. Every cell is still text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    headers: std::sync::Arc<Headers>,
    values: Vec<String>,
    line: u64,
}

impl RawRecord {
    /// Returns the cell under `header`, or `None` when the header is unknown
    /// or the row ended before that column.
    pub fn get(&self, header: &str) -> Option<&str> {
        let idx = self.headers.position(header)?;
        self.values.get(idx).map(String::as_str)
    }

    /// Line in the source file where this row starts (1-based, header is line 1).
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Iterates `(header, value)` pairs for the cells present in this row.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Parsed contents of one CSV file: the header row plus its data rows in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: std::sync::Arc<Headers>,
    pub records: Vec<RawRecord>,
}

impl CsvTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Quoting state while scanning raw CSV bytes.
enum QuoteState {
    FieldStart,
    Unquoted,
    /// Inside a quoted field opened on the given line.
    Quoted(u64),
}

/// Checks that every field follows standard CSV quoting.
///
/// The `csv` parser recovers from bad quoting silently, so this runs over the
/// raw bytes first. A quote may only open a field, `""` is an escaped quote,
/// and a closing quote must be followed by a delimiter, a line break or the
/// end of input.
fn quote_errors(bytes: &[u8]) -> Vec<String> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let mut messages = Vec::new();
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
        }
        state = match state {
            QuoteState::Quoted(opened) => match (b, bytes.get(i + 1)) {
                (b'"', Some(b'"')) => {
                    i += 1;
                    QuoteState::Quoted(opened)
                }
                (b'"', None | Some(b',' | b'\n' | b'\r')) => QuoteState::Unquoted,
                (b'"', Some(_)) => {
                    messages.push(format!("Invalid text after closing quote (line {})", line));
                    QuoteState::Unquoted
                }
                _ => QuoteState::Quoted(opened),
            },
            QuoteState::FieldStart if b == b'"' => QuoteState::Quoted(line),
            QuoteState::FieldStart | QuoteState::Unquoted => match b {
                b'"' => {
                    messages.push(format!("Unexpected quote inside unquoted field (line {})", line));
                    QuoteState::Unquoted
                }
                b',' | b'\n' | b'\r' => QuoteState::FieldStart,
                _ => QuoteState::Unquoted,
            },
        };
        i += 1;
    }

    if let QuoteState::Quoted(opened) = state {
        messages.push(format!("Quoted field opened on line {} is never closed", opened));
    }
    messages
}

/// Reads a comma-separated byte stream whose first row is the header row.
///
/// This function:
/// 1. Reads the whole stream and checks its quoting.
/// 2. Reads and normalises the header row (trim, BOM, duplicates).
/// 3. Reads every remaining row, skipping empty lines.
/// 4. Collects structural problems instead of stopping at the first one.
///
/// Rows shorter than the header are accepted; their trailing cells are simply
/// absent. Malformed quoting, rows longer than the header, invalid UTF-8 and
/// read failures are structural problems.
///
/// # Arguments
/// * `reader` - Any byte source holding UTF-8 CSV text.
///
/// # Returns
/// * `Result<CsvTable, CsvParseError>` - All rows, or every structural message found.
///
/// # Errors
/// * If any structural problem was found. No rows are returned in that case.
pub fn load_records<R: std::io::Read>(mut reader: R) -> Result<CsvTable, CsvParseError> {
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_to_end(&mut bytes) {
        return Err(CsvParseError {
            messages: vec![e.to_string()],
        });
    }
    let mut messages = quote_errors(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let header_cells = match reader.byte_headers() {
        Ok(record) => record.clone(),
        Err(e) => {
            messages.push(e.to_string());
            return Err(CsvParseError { messages });
        }
    };
    let mut header_names = Vec::with_capacity(header_cells.len());
    for (i, cell) in header_cells.iter().enumerate() {
        match std::str::from_utf8(cell) {
            Ok(s) => header_names.push(s.to_string()),
            Err(_) => {
                messages.push(format!("Invalid UTF-8 in header column {}", i + 1));
                header_names.push(String::from_utf8_lossy(cell).into_owned());
            }
        }
    }
    let headers = std::sync::Arc::new(Headers::new(header_names));

    let mut records = Vec::new();
    for result in reader.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                messages.push(e.to_string());
                continue;
            }
        };

        let line = record.position().map_or(0, |p| p.line());
        if record.is_empty() || (record.len() == 1 && record[0].is_empty()) {
            continue;
        }
        if !headers.is_empty() && record.len() > headers.len() {
            messages.push(format!(
                "Too many fields: expected {} fields but parsed {} (line {})",
                headers.len(),
                record.len(),
                line
            ));
            continue;
        }

        let mut values = Vec::with_capacity(record.len());
        let mut valid = true;
        for (i, cell) in record.iter().enumerate() {
            match std::str::from_utf8(cell) {
                Ok(s) => values.push(s.to_string()),
                Err(_) => {
                    messages.push(format!("Invalid UTF-8 in column {} (line {})", i + 1, line));
                    valid = false;
                    break;
                }
            }
        }
        if valid {
            records.push(RawRecord {
                headers: std::sync::Arc::clone(&headers),
                values,
                line,
            });
        }
    }

    if !messages.is_empty() {
        tracing::debug!(errors = messages.len(), "CSV structural errors");
        return Err(CsvParseError { messages });
    }

    Ok(CsvTable { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<CsvTable, CsvParseError> {
        load_records(text.as_bytes())
    }

    #[test]
    fn test_headers_are_trimmed() {
        let table = parse(" Symbol , Close Price\nICICIBANK,1426.20\n").unwrap();
        assert_eq!(table.headers.names(), &["Symbol", "Close Price"]);
        assert_eq!(table.records[0].get("Symbol"), Some("ICICIBANK"));
        assert_eq!(table.records[0].get("Close Price"), Some("1426.20"));
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let table = parse("Symbol,Series\n ICICIBANK , EQ\n").unwrap();
        assert_eq!(table.records[0].get("Symbol"), Some(" ICICIBANK "));
        assert_eq!(table.records[0].get("Series"), Some(" EQ"));
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let table = parse("Symbol,Series\n\nA,EQ\n\n\nB,BE\n\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("Symbol"), Some("A"));
        assert_eq!(table.records[1].get("Symbol"), Some("B"));
    }

    #[test]
    fn test_short_row_leaves_cells_absent() {
        let table = parse("Symbol,Series,Date\nA,EQ\n").unwrap();
        let row = &table.records[0];
        assert_eq!(row.get("Series"), Some("EQ"));
        assert_eq!(row.get("Date"), None);
        assert_eq!(row.get("Unknown"), None);
    }

    #[test]
    fn test_rows_keep_source_order() {
        let table = parse("Date\n03-05-2025\n01-05-2025\n02-05-2025\n").unwrap();
        let dates: Vec<_> = table.records.iter().filter_map(|r| r.get("Date")).collect();
        assert_eq!(dates, vec!["03-05-2025", "01-05-2025", "02-05-2025"]);
    }

    #[test]
    fn test_quoted_fields() {
        let table = parse("Company Name,Industry\n\"ICICI Bank, Ltd.\",Banks\n").unwrap();
        assert_eq!(table.records[0].get("Company Name"), Some("ICICI Bank, Ltd."));
    }

    #[test]
    fn test_too_many_fields_fails_whole_file() {
        let err = parse("A,B\n1,2\n1,2,3\n4,5,6,7\n").unwrap_err();
        assert_eq!(err.messages.len(), 2);
        assert!(err.messages[0].starts_with("Too many fields: expected 2 fields but parsed 3"));
        assert!(err.messages[1].contains("parsed 4"));
    }

    #[test]
    fn test_unterminated_quote_fails_whole_file() {
        let err = parse("Symbol,Series\n\"ICICIBANK,EQ\nHDFCBANK,EQ\n").unwrap_err();
        assert_eq!(err.messages, vec!["Quoted field opened on line 2 is never closed"]);
    }

    #[test]
    fn test_stray_quotes_fail_whole_file() {
        let err = parse("Symbol,Series\nIC\"ICI,EQ\n\"A\"B,EQ\n").unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "Unexpected quote inside unquoted field (line 2)",
                "Invalid text after closing quote (line 3)",
            ]
        );
    }

    #[test]
    fn test_escaped_quotes_and_quoted_line_breaks() {
        let table = parse("Company Name,Industry\r\n\"ICICI \"\"Bank\"\"\",\"Private\nBanks\"\r\n\"\",\"\"\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("Company Name"), Some("ICICI \"Bank\""));
        assert_eq!(table.records[0].get("Industry"), Some("Private\nBanks"));
        assert_eq!(table.records[1].get("Company Name"), Some(""));
    }

    #[test]
    fn test_invalid_utf8_is_structural() {
        let bytes: &[u8] = b"A,B\n1,\xff\xfe\n";
        let err = load_records(bytes).unwrap_err();
        assert_eq!(err.messages.len(), 1);
        assert!(err.messages[0].contains("Invalid UTF-8"));
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let table = parse("\u{feff}Symbol,Series\nA,EQ\n").unwrap();
        assert!(table.headers.contains("Symbol"));
        assert_eq!(table.records[0].get("Symbol"), Some("A"));
    }

    #[test]
    fn test_duplicate_headers_get_suffix() {
        let table = parse("Symbol,Symbol,Symbol\nA,B,C\n").unwrap();
        assert_eq!(table.headers.names(), &["Symbol", "Symbol_1", "Symbol_2"]);
        assert_eq!(table.records[0].get("Symbol_1"), Some("B"));
    }

    #[test]
    fn test_header_only_file_has_no_records() {
        let table = parse("Symbol,Series\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let table = parse("").unwrap();
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn test_line_numbers() {
        let table = parse("A\nx\ny\n").unwrap();
        assert_eq!(table.records[0].line(), 2);
        assert_eq!(table.records[1].line(), 3);
    }
}
