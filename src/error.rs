use crate::records::Category;

/// Structural failure reported by the CSV loader for a single file.
///
/// Carries every parser message collected while reading the file, in the
/// order they were encountered. A file that produces this error yields no
/// records at all.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("CSV parsing errors: {}", .messages.join(", "))]
pub struct CsvParseError {
    pub messages: Vec<String>,
}

/// Field-level failures raised by the normalizer under `CoercionPolicy::Strict`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("missing column(s) {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("row {row}: missing value for '{field}'")]
    MissingField { row: usize, field: String },

    #[error("row {row}: invalid numeric value {value:?} for '{field}'")]
    InvalidNumber {
        row: usize,
        field: String,
        value: String,
    },
}

/// Failure of one (source, shape) pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] CsvParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Errors surfaced by a load of all five datasets.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// One or more required sources were not supplied. Raised before any
    /// source is opened.
    #[error("file required: {}", list_categories(.categories))]
    MissingInput { categories: Vec<Category> },

    /// A pipeline failed; no dataset is produced.
    #[error("processing failed: {message}")]
    ProcessingFailed {
        message: String,
        #[source]
        source: PipelineError,
    },
}

impl LoadError {
    pub(crate) fn processing_failed(source: PipelineError) -> Self {
        LoadError::ProcessingFailed {
            message: source.to_string(),
            source,
        }
    }
}

fn list_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}
