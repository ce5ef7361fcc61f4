use polars::prelude::PolarsError;
use thiserror::Error;

use crate::frames::ImageRange;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid image range [{first}, {last}]: image numbers start at 1 and last may not precede first - 1")]
    InvalidImageRange { first: u32, last: u32 },

    #[error("{what} slice [{start}, {end}) out of bounds for length {len}")]
    SliceOutOfBounds {
        what: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("{what} images {requested} not contained in available images {available}")]
    ImagesOutOfRange {
        what: &'static str,
        requested: ImageRange,
        available: ImageRange,
    },

    #[error("scan {field} has {found} entries but the scan spans {expected} images")]
    PerImageLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("reflection column '{column}' invalid: {reason}")]
    Column {
        column: &'static str,
        reason: String,
    },

    #[error("reflection column '{column}' has a null value at row {row}")]
    NullValue { column: &'static str, row: usize },

    #[error("reflection {row} references experiment {owner_id} but only {n_experiments} experiments exist")]
    DanglingReflection {
        row: usize,
        owner_id: i32,
        n_experiments: usize,
    },

    #[error("experiment {position} references {kind} model {index} but only {available} are defined")]
    ModelIndex {
        kind: &'static str,
        position: usize,
        index: usize,
        available: usize,
    },

    #[error("unexpected experiment list document type '{0}'")]
    DocumentType(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON operation failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// True for errors caused by one collection disagreeing with another or with itself, as
    /// opposed to errors reading or writing storage.
    pub fn is_consistency_error(&self) -> bool {
        !matches!(
            self,
            ModelError::Polars(_) | ModelError::Json(_) | ModelError::Io(_)
        )
    }
}
