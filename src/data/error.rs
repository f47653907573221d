use thiserror::Error;

use super::model::REQUIRED_COLUMNS;

/// Everything that can go wrong between a raw source and a lookup result.
///
/// "No match" is deliberately absent: an empty dataset yields `None` from the
/// finder, not an error.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The source could not be read as a table at all.
    #[error("failed to read table: {0}")]
    Format(#[from] FormatError),

    /// The table parsed, but one or more required columns are missing.
    #[error(
        "invalid data structure: missing column(s) {missing:?}; \
         expected columns {required:?}, found {found:?}",
        required = REQUIRED_COLUMNS
    )]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A query value typed by the user is not a finite number.
    #[error("invalid {field} '{input}': expected a finite number")]
    InvalidQuery { field: &'static str, input: String },

    /// The source is larger than the configured limit.
    #[error("source is {size} bytes, the maximum accepted size is {limit} bytes")]
    SourceTooLarge { size: u64, limit: u64 },
}

/// Underlying cause of a [`LookupError::Format`].
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// The source parsed but its shape is not a table (e.g. JSON that is not
    /// an array of objects).
    #[error("{0}")]
    Malformed(String),

    /// A cell of a required column is not a finite number.
    #[error("row {row}, column '{column}': '{value}' is not a finite number")]
    NonNumericCell {
        row: usize,
        column: String,
        value: String,
    },
}
