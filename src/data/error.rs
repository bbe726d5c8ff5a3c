/// Error types for loading the merged observation table
use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning a file into an [`ObservationTable`](super::model::ObservationTable).
#[derive(Error, Debug)]
pub enum LoadError {
    /// File missing, unreadable or structurally malformed
    #[error("Failed to load {}: {reason}", .path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// Required columns absent from the header / schema
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// `Year` value that cannot be coerced to an integer
    #[error("Row {row}: cannot convert Year value '{value}' to an integer")]
    TypeConversion { row: usize, value: String },

    /// Numeric measurement that is present but not a number
    #[error("Row {row}, column '{column}': '{value}' is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// File extension not handled by any loader
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Failed to decode Arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    /// Whether this error came from the `Year` coercion step.
    pub fn is_type_conversion(&self) -> bool {
        matches!(self, LoadError::TypeConversion { .. })
    }
}

/// Type alias for Results using LoadError
pub type Result<T> = std::result::Result<T, LoadError>;
