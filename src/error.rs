use thiserror::Error;

/// Convenience result type for fallible operations (table loading).
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Error type returned when loading raw-counter tables.
///
/// The processed-metrics filter itself is infallible; only I/O and parsing at the edges can fail.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the shape of a raw-counter table.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be converted into a [`crate::types::Value`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}
