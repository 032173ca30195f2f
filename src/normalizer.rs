use crate::coerce::{self, CoercionPolicy};
use crate::csv_loader::{CsvTable, RawRecord};
use crate::error::NormalizeError;
use crate::records::{
    Category, IndexRecord, NormalizedRows, PeerRecord, SectorIndexRecord, SectorRecord,
    StockRecord,
};

const DELIVERY_PCT: &[&str] = &["% Dly Qt to Traded Qty", "%Dly Qt to Traded Qty"];
const INDEX_TURNOVER: &[&str] = &["Turnover (Rs. Cr.)", "Turnover (₹ Cr.)"];

/// A record shape that can be built from one raw CSV row.
pub trait Normalize: Sized {
    const CATEGORY: Category;

    /// Logical columns of the shape, each given as its accepted header names.
    const COLUMNS: &'static [&'static [&'static str]];

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError>;
}

/// Typed accessor over one raw row, applying the coercion policy.
pub struct FieldReader<'a> {
    record: &'a RawRecord,
    row: usize,
    policy: CoercionPolicy,
    fallbacks: &'a mut std::collections::BTreeMap<&'static str, usize>,
}

impl<'a> FieldReader<'a> {
    /// Text cell, passed through untouched.
    pub fn text(&mut self, field: &'static str) -> Result<String, NormalizeError> {
        match self.record.get(field) {
            Some(v) => Ok(v.to_string()),
            None => match self.policy {
                CoercionPolicy::FallbackToZero => Ok(String::new()),
                CoercionPolicy::Strict => Err(NormalizeError::MissingField {
                    row: self.row,
                    field: field.to_string(),
                }),
            },
        }
    }

    /// Decimal cell under the first alias that holds a non-zero number. A zero
    /// is taken only when no alias holds anything else.
    pub fn number(&mut self, aliases: &'static [&'static str]) -> Result<f64, NormalizeError> {
        self.coerce(aliases, coerce::parse_float_prefix)
    }

    /// Integer cell; fractional digits are dropped.
    pub fn integer(&mut self, aliases: &'static [&'static str]) -> Result<f64, NormalizeError> {
        self.coerce(aliases, coerce::parse_int_prefix)
    }

    /// Decimal cell for a column only some exports carry. Never fails.
    pub fn optional_number(&mut self, aliases: &'static [&'static str]) -> Option<f64> {
        aliases
            .iter()
            .filter_map(|a| self.record.get(a))
            .find_map(coerce::parse_float_prefix)
    }

    fn coerce(
        &mut self,
        aliases: &'static [&'static str],
        parse: fn(&str) -> Option<f64>,
    ) -> Result<f64, NormalizeError> {
        let mut zero = None;
        for v in aliases.iter().filter_map(|a| self.record.get(a)).filter_map(parse) {
            if v != 0.0 {
                return Ok(v);
            }
            zero.get_or_insert(v);
        }
        if let Some(v) = zero {
            return Ok(v);
        }

        match self.policy {
            CoercionPolicy::FallbackToZero => {
                *self.fallbacks.entry(aliases[0]).or_insert(0) += 1;
                Ok(0.0)
            }
            CoercionPolicy::Strict => {
                let raw = aliases.iter().find_map(|a| self.record.get(a));
                match raw {
                    Some(value) => Err(NormalizeError::InvalidNumber {
                        row: self.row,
                        field: aliases[0].to_string(),
                        value: value.to_string(),
                    }),
                    None => Err(NormalizeError::MissingField {
                        row: self.row,
                        field: aliases[0].to_string(),
                    }),
                }
            }
        }
    }
}

impl Normalize for StockRecord {
    const CATEGORY: Category = Category::Stock;
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["Symbol"],
        &["Series"],
        &["Date"],
        &["Prev Close"],
        &["Open Price"],
        &["High Price"],
        &["Low Price"],
        &["Last Price"],
        &["Close Price"],
        &["Average Price"],
        &["Total Traded Quantity"],
        &["Turnover ₹"],
        &["No. of Trades"],
        &["Deliverable Qty"],
        DELIVERY_PCT,
    ];

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError> {
        Ok(StockRecord {
            symbol: row.text("Symbol")?,
            series: row.text("Series")?,
            date: row.text("Date")?,
            prev_close: row.number(&["Prev Close"])?,
            open_price: row.number(&["Open Price"])?,
            high_price: row.number(&["High Price"])?,
            low_price: row.number(&["Low Price"])?,
            last_price: row.number(&["Last Price"])?,
            close_price: row.number(&["Close Price"])?,
            average_price: row.number(&["Average Price"])?,
            total_traded_quantity: row.number(&["Total Traded Quantity"])?,
            turnover: row.number(&["Turnover ₹"])?,
            trades: row.integer(&["No. of Trades"])?,
            deliverable_qty: row.number(&["Deliverable Qty"])?,
            delivery_pct: row.number(DELIVERY_PCT)?,
            total_traded_value: row.optional_number(&["Total Traded Value"]),
        })
    }
}

impl Normalize for SectorRecord {
    const CATEGORY: Category = Category::Sector;
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["Company Name"],
        &["Industry"],
        &["Symbol"],
        &["Series"],
        &["ISIN Code"],
    ];

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError> {
        Ok(SectorRecord {
            company_name: row.text("Company Name")?,
            industry: row.text("Industry")?,
            symbol: row.text("Symbol")?,
            series: row.text("Series")?,
            isin_code: row.text("ISIN Code")?,
        })
    }
}

impl Normalize for PeerRecord {
    const CATEGORY: Category = Category::Peer;
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["Date"],
        &["Symbol"],
        &["Open Price"],
        &["Close Price"],
        &["Total Traded Quantity"],
        DELIVERY_PCT,
    ];

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError> {
        Ok(PeerRecord {
            date: row.text("Date")?,
            symbol: row.text("Symbol")?,
            open_price: row.number(&["Open Price"])?,
            close_price: row.number(&["Close Price"])?,
            total_traded_quantity: row.number(&["Total Traded Quantity"])?,
            delivery_pct: row.number(DELIVERY_PCT)?,
        })
    }
}

const INDEX_COLUMNS: &[&[&str]] = &[
    &["Index Name"],
    &["Index Date"],
    &["Open Index Value"],
    &["High Index Value"],
    &["Low Index Value"],
    &["Closing Index Value"],
    &["Points Change"],
    &["Change(%)"],
    &["Volume"],
    INDEX_TURNOVER,
    &["P/E"],
    &["P/B"],
    &["Div Yield"],
];

impl Normalize for IndexRecord {
    const CATEGORY: Category = Category::Index;
    const COLUMNS: &'static [&'static [&'static str]] = INDEX_COLUMNS;

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError> {
        Ok(IndexRecord {
            index_name: row.text("Index Name")?,
            index_date: row.text("Index Date")?,
            open: row.number(&["Open Index Value"])?,
            high: row.number(&["High Index Value"])?,
            low: row.number(&["Low Index Value"])?,
            close: row.number(&["Closing Index Value"])?,
            points_change: row.number(&["Points Change"])?,
            change_pct: row.number(&["Change(%)"])?,
            volume: row.number(&["Volume"])?,
            turnover_cr: row.number(INDEX_TURNOVER)?,
            pe: row.number(&["P/E"])?,
            pb: row.number(&["P/B"])?,
            div_yield: row.number(&["Div Yield"])?,
        })
    }
}

impl Normalize for SectorIndexRecord {
    const CATEGORY: Category = Category::SectorIndex;
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["Index Name"],
        &["Index Date"],
        &["Open Index Value"],
        &["High Index Value"],
        &["Low Index Value"],
        &["Closing Index Value"],
        &["Points Change"],
        &["Change(%)"],
        &["Volume"],
        INDEX_TURNOVER,
        &["P/E"],
        &["P/B"],
        &["Div Yield"],
        &["Sector"],
    ];

    fn from_row(row: &mut FieldReader<'_>) -> Result<Self, NormalizeError> {
        let index = IndexRecord::from_row(row)?;
        Ok(SectorIndexRecord {
            sector: row.text("Sector")?,
            index,
        })
    }
}

/// Header columns of shape `T` that the table does not carry under any alias.
pub fn missing_columns<T: Normalize>(table: &CsvTable) -> Vec<String> {
    T::COLUMNS
        .iter()
        .filter(|aliases| !aliases.iter().any(|a| table.headers.contains(a)))
        .map(|aliases| aliases[0].to_string())
        .collect()
}

/// Maps every row of `table` onto shape `T`, in source order.
///
/// Under `CoercionPolicy::FallbackToZero` this never fails: absent or
/// unparseable numbers become `0` and absent text becomes empty. Columns and
/// cells that were filled in are reported through `tracing` once per file.
///
/// # Arguments
/// * `table` - Rows produced by the CSV loader.
/// * `policy` - What to do with cells that do not hold a number.
///
/// # Returns
/// * `Result<Vec<T>, NormalizeError>` - One typed record per input row.
///
/// # Errors
/// * Under `CoercionPolicy::Strict`, if a column is missing from the header or
///   a row holds an absent or non-numeric value.
pub fn normalize_rows<T: Normalize>(
    table: &CsvTable,
    policy: CoercionPolicy,
) -> Result<Vec<T>, NormalizeError> {
    let category = T::CATEGORY;
    let missing = missing_columns::<T>(table);
    if !missing.is_empty() {
        match policy {
            CoercionPolicy::Strict => {
                return Err(NormalizeError::MissingColumns { columns: missing });
            }
            CoercionPolicy::FallbackToZero => {
                let columns = missing.join(", ");
                tracing::warn!(
                    category = %category,
                    columns = %columns,
                    "missing columns, values default to 0 or empty"
                );
            }
        }
    }

    let mut fallbacks = std::collections::BTreeMap::new();
    let mut rows = Vec::with_capacity(table.len());
    for (i, record) in table.records.iter().enumerate() {
        let mut reader = FieldReader {
            record,
            row: i + 1,
            policy,
            fallbacks: &mut fallbacks,
        };
        rows.push(T::from_row(&mut reader)?);
    }

    for (field, count) in &fallbacks {
        tracing::warn!(
            category = %category,
            field = %field,
            count = *count,
            "non-numeric cells replaced by 0"
        );
    }

    Ok(rows)
}

/// Normalizes `table` into the shape selected by `category`.
///
/// Sector mappings are special: every row is normalized but only the first is
/// kept as the sector info of the dataset.
pub fn normalize(
    table: &CsvTable,
    category: Category,
    policy: CoercionPolicy,
) -> Result<NormalizedRows, NormalizeError> {
    let rows = match category {
        Category::Stock => NormalizedRows::Stock(normalize_rows(table, policy)?),
        Category::Sector => {
            let all: Vec<SectorRecord> = normalize_rows(table, policy)?;
            if all.len() > 1 {
                tracing::debug!(discarded = all.len() - 1, "keeping first sector mapping only");
            }
            NormalizedRows::Sector(all.into_iter().next())
        }
        Category::Peer => NormalizedRows::Peer(normalize_rows(table, policy)?),
        Category::Index => NormalizedRows::Index(normalize_rows(table, policy)?),
        Category::SectorIndex => NormalizedRows::SectorIndex(normalize_rows(table, policy)?),
    };
    Ok(rows)
}
