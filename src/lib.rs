//! Ingestion of the five CSV exports behind the stock analysis dashboard.
//!
//! A load reads a stock history, a sector mapping, peer histories, a market
//! index and a sector index. Each file goes through the CSV loader and the
//! schema normalizer, and the results are returned together as one
//! [`AggregateDataset`].

pub mod coerce;
pub mod csv_loader;
pub mod dataset;
pub mod dates;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod records;

pub use coerce::CoercionPolicy;
pub use csv_loader::{CsvTable, Headers, RawRecord};
pub use dataset::{AggregateDataset, DatasetSummary};
pub use error::{CsvParseError, LoadError, NormalizeError, PipelineError};
pub use pipeline::{CsvSource, ExecutionMode, InputFiles, LoadOptions, load, load_with_progress};
pub use records::{
    Category, IndexRecord, NormalizedRows, PeerRecord, SectorIndexRecord, SectorRecord,
    StockRecord,
};
