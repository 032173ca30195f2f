/// The five dataset categories a load requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Category {
    Stock,
    Sector,
    Peer,
    Index,
    SectorIndex,
}

impl Category {
    /// All categories, in the order pipelines are reported.
    pub const ALL: [Category; 5] = [
        Category::Stock,
        Category::Sector,
        Category::Peer,
        Category::Index,
        Category::SectorIndex,
    ];

    /// Human-readable label used in error messages and progress output.
    pub fn label(self) -> &'static str {
        match self {
            Category::Stock => "Stock Data",
            Category::Sector => "Sector Mapping",
            Category::Peer => "Peer Stocks",
            Category::Index => "Index Data",
            Category::SectorIndex => "Sector Index",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One trading day for the analysed instrument.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StockRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Prev Close")]
    pub prev_close: f64,
    #[serde(rename = "Open Price")]
    pub open_price: f64,
    #[serde(rename = "High Price")]
    pub high_price: f64,
    #[serde(rename = "Low Price")]
    pub low_price: f64,
    #[serde(rename = "Last Price")]
    pub last_price: f64,
    #[serde(rename = "Close Price")]
    pub close_price: f64,
    #[serde(rename = "Average Price")]
    pub average_price: f64,
    #[serde(rename = "Total Traded Quantity")]
    pub total_traded_quantity: f64,
    #[serde(rename = "Turnover ₹")]
    pub turnover: f64,
    #[serde(rename = "No. of Trades")]
    pub trades: f64,
    #[serde(rename = "Deliverable Qty")]
    pub deliverable_qty: f64,
    #[serde(rename = "% Dly Qt to Traded Qty")]
    pub delivery_pct: f64,
    /// Only some exports carry this column.
    #[serde(rename = "Total Traded Value", skip_serializing_if = "Option::is_none")]
    pub total_traded_value: Option<f64>,
}

/// Static mapping from symbol to company and industry.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SectorRecord {
    #[serde(rename = "Company Name")]
    pub company_name: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "ISIN Code")]
    pub isin_code: String,
}

/// One trading day for a peer instrument.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PeerRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Open Price")]
    pub open_price: f64,
    #[serde(rename = "Close Price")]
    pub close_price: f64,
    #[serde(rename = "Total Traded Quantity")]
    pub total_traded_quantity: f64,
    #[serde(rename = "% Dly Qt to Traded Qty")]
    pub delivery_pct: f64,
}

/// One day's summary for a market-wide index.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IndexRecord {
    #[serde(rename = "Index Name")]
    pub index_name: String,
    #[serde(rename = "Index Date")]
    pub index_date: String,
    #[serde(rename = "Open Index Value")]
    pub open: f64,
    #[serde(rename = "High Index Value")]
    pub high: f64,
    #[serde(rename = "Low Index Value")]
    pub low: f64,
    #[serde(rename = "Closing Index Value")]
    pub close: f64,
    #[serde(rename = "Points Change")]
    pub points_change: f64,
    #[serde(rename = "Change(%)")]
    pub change_pct: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "Turnover (Rs. Cr.)")]
    pub turnover_cr: f64,
    #[serde(rename = "P/E")]
    pub pe: f64,
    #[serde(rename = "P/B")]
    pub pb: f64,
    #[serde(rename = "Div Yield")]
    pub div_yield: f64,
}

/// An index record for a sector benchmark, tagged with its sector.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SectorIndexRecord {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(flatten)]
    pub index: IndexRecord,
}

/// Output of normalizing one file, tagged by its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRows {
    Stock(Vec<StockRecord>),
    Sector(Option<SectorRecord>),
    Peer(Vec<PeerRecord>),
    Index(Vec<IndexRecord>),
    SectorIndex(Vec<SectorIndexRecord>),
}

impl NormalizedRows {
    pub fn category(&self) -> Category {
        match self {
            NormalizedRows::Stock(_) => Category::Stock,
            NormalizedRows::Sector(_) => Category::Sector,
            NormalizedRows::Peer(_) => Category::Peer,
            NormalizedRows::Index(_) => Category::Index,
            NormalizedRows::SectorIndex(_) => Category::SectorIndex,
        }
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        match self {
            NormalizedRows::Stock(rows) => rows.len(),
            NormalizedRows::Sector(info) => usize::from(info.is_some()),
            NormalizedRows::Peer(rows) => rows.len(),
            NormalizedRows::Index(rows) => rows.len(),
            NormalizedRows::SectorIndex(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
