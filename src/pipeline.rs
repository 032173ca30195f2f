use crate::coerce::CoercionPolicy;
use crate::csv_loader;
use crate::dataset::AggregateDataset;
use crate::error::{LoadError, PipelineError};
use crate::normalizer;
use crate::records::{Category, NormalizedRows};

use rayon::prelude::*;

/// Where one CSV file comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvSource {
    Path(std::path::PathBuf),
    Bytes(Vec<u8>),
}

impl CsvSource {
    fn open(&self) -> Result<Box<dyn std::io::Read + '_>, PipelineError> {
        match self {
            CsvSource::Path(path) => Ok(Box::new(std::io::BufReader::new(std::fs::File::open(path)?))),
            CsvSource::Bytes(bytes) => Ok(Box::new(bytes.as_slice())),
        }
    }

    fn describe(&self) -> String {
        match self {
            CsvSource::Path(path) => path.display().to_string(),
            CsvSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<std::path::PathBuf> for CsvSource {
    fn from(path: std::path::PathBuf) -> Self {
        CsvSource::Path(path)
    }
}

impl From<&std::path::Path> for CsvSource {
    fn from(path: &std::path::Path) -> Self {
        CsvSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for CsvSource {
    fn from(bytes: Vec<u8>) -> Self {
        CsvSource::Bytes(bytes)
    }
}

impl From<&str> for CsvSource {
    /// In-memory CSV text.
    fn from(text: &str) -> Self {
        CsvSource::Bytes(text.as_bytes().to_vec())
    }
}

/// The five input slots a load needs. Every slot is mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFiles {
    pub stock: Option<CsvSource>,
    pub sector: Option<CsvSource>,
    pub peer: Option<CsvSource>,
    pub index: Option<CsvSource>,
    pub sector_index: Option<CsvSource>,
}

impl InputFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the slot for `category`, replacing any earlier source.
    pub fn with(mut self, category: Category, source: impl Into<CsvSource>) -> Self {
        self.set(category, source);
        self
    }

    pub fn set(&mut self, category: Category, source: impl Into<CsvSource>) {
        *self.slot_mut(category) = Some(source.into());
    }

    pub fn get(&self, category: Category) -> Option<&CsvSource> {
        match category {
            Category::Stock => self.stock.as_ref(),
            Category::Sector => self.sector.as_ref(),
            Category::Peer => self.peer.as_ref(),
            Category::Index => self.index.as_ref(),
            Category::SectorIndex => self.sector_index.as_ref(),
        }
    }

    /// Categories whose slot is still empty, in category order.
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<CsvSource> {
        match category {
            Category::Stock => &mut self.stock,
            Category::Sector => &mut self.sector,
            Category::Peer => &mut self.peer,
            Category::Index => &mut self.index,
            Category::SectorIndex => &mut self.sector_index,
        }
    }
}

/// How the five per-file pipelines are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// On the current rayon pool.
    #[default]
    Parallel,
    /// One after another on the calling thread.
    Sequential,
}

/// Options for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub policy: CoercionPolicy,
    pub mode: ExecutionMode,
}

/// Runs the loader and normalizer for one source.
///
/// # Arguments
/// * `source` - The CSV bytes or file for this category.
/// * `category` - Target record shape.
/// * `policy` - Numeric coercion policy.
///
/// # Returns
/// * `Result<NormalizedRows, PipelineError>` - Typed rows for this category.
///
/// # Errors
/// * If the source cannot be opened or read.
/// * If the CSV is structurally malformed.
/// * Under `CoercionPolicy::Strict`, if a field does not validate.
pub fn run_pipeline(
    source: &CsvSource,
    category: Category,
    policy: CoercionPolicy,
) -> Result<NormalizedRows, PipelineError> {
    let start = std::time::Instant::now();
    let reader = source.open()?;
    let table = csv_loader::load_records(reader)?;
    let rows = normalizer::normalize(&table, category, policy)?;
    let origin = source.describe();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(
        category = %category,
        source = %origin,
        parsed = table.len(),
        retained = rows.len(),
        elapsed_ms,
        "pipeline finished"
    );
    Ok(rows)
}

/// Loads all five datasets and assembles them into one aggregate.
///
/// See [`load_with_progress`].
pub fn load(files: &InputFiles, options: LoadOptions) -> Result<AggregateDataset, LoadError> {
    load_with_progress(files, options, &|_| {})
}

/// Loads all five datasets, calling `on_done` as each category's pipeline
/// finishes successfully.
///
/// This function:
/// 1. Checks that every slot is filled, before any source is opened.
/// 2. Runs the five loader/normalizer pipelines, in parallel or in sequence.
/// 3. Waits for all of them.
/// 4. Returns the aggregate, or the first failure in category order.
///
/// Error selection does not depend on scheduling, so both execution modes
/// return the same result for the same input.
///
/// # Arguments
/// * `files` - The five input sources.
/// * `options` - Coercion policy and execution mode.
/// * `on_done` - Called once per finished category, possibly from worker threads.
///
/// # Returns
/// * `Result<AggregateDataset, LoadError>` - The complete dataset, never a partial one.
///
/// # Errors
/// * `LoadError::MissingInput` listing every empty slot.
/// * `LoadError::ProcessingFailed` wrapping the first pipeline failure.
pub fn load_with_progress(
    files: &InputFiles,
    options: LoadOptions,
    on_done: &(dyn Fn(Category) + Sync),
) -> Result<AggregateDataset, LoadError> {
    let missing = files.missing();
    if !missing.is_empty() {
        tracing::warn!(missing = missing.len(), "load refused, required files missing");
        return Err(LoadError::MissingInput { categories: missing });
    }

    let start = std::time::Instant::now();
    let sources: Vec<(Category, &CsvSource)> = Category::ALL
        .into_iter()
        .filter_map(|c| files.get(c).map(|s| (c, s)))
        .collect();
    let run = |&(category, source): &(Category, &CsvSource)| -> Result<NormalizedRows, PipelineError> {
        let rows = run_pipeline(source, category, options.policy)?;
        on_done(category);
        Ok(rows)
    };

    let results: Vec<Result<NormalizedRows, PipelineError>> = match options.mode {
        ExecutionMode::Parallel => sources.par_iter().map(run).collect(),
        ExecutionMode::Sequential => sources.iter().map(run).collect(),
    };

    let mut dataset = AggregateDataset::default();
    for result in results {
        match result.map_err(LoadError::processing_failed)? {
            NormalizedRows::Stock(rows) => dataset.stock = rows,
            NormalizedRows::Sector(info) => dataset.sector_info = info,
            NormalizedRows::Peer(rows) => dataset.peers = rows,
            NormalizedRows::Index(rows) => dataset.index = rows,
            NormalizedRows::SectorIndex(rows) => dataset.sector_index = rows,
        }
    }

    let summary = dataset.summary();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(summary = %summary, elapsed_ms, "dataset loaded");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTOR: &str = "Company Name,Industry,Symbol,Series,ISIN Code\nICICI Bank Ltd.,Banks,ICICIBANK,EQ,INE090A01021\n";

    #[test]
    fn test_missing_lists_every_empty_slot() {
        let files = InputFiles::new()
            .with(Category::Stock, "a\n")
            .with(Category::Index, "a\n");
        assert_eq!(
            files.missing(),
            vec![Category::Sector, Category::Peer, Category::SectorIndex]
        );
    }

    #[test]
    fn test_missing_input_fails_before_reading() {
        let files = InputFiles::new()
            .with(Category::Stock, std::path::PathBuf::from("/definitely/not/here.csv"))
            .with(Category::Sector, SECTOR);
        let err = load(&files, LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MissingInput { categories } => {
                assert_eq!(
                    categories,
                    vec![Category::Peer, Category::Index, Category::SectorIndex]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_pipeline_from_bytes() {
        let rows = run_pipeline(&CsvSource::from(SECTOR), Category::Sector, CoercionPolicy::Strict).unwrap();
        assert_eq!(rows.category(), Category::Sector);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_run_pipeline_missing_path_is_io() {
        let source = CsvSource::from(std::path::PathBuf::from("/definitely/not/here.csv"));
        let err = run_pipeline(&source, Category::Stock, CoercionPolicy::FallbackToZero).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_with_replaces_earlier_source() {
        let files = InputFiles::new()
            .with(Category::Peer, "first")
            .with(Category::Peer, "second");
        assert_eq!(files.get(Category::Peer), Some(&CsvSource::from("second")));
    }
}
