//! Error types for the towt library.

use thiserror::Error;

/// Result type alias for baseline modeling operations.
pub type Result<T> = std::result::Result<T, TowtError>;

/// Errors that can occur while preparing data, selecting bins or fitting models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TowtError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// A required attribute (column) is not present in the input.
    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Fewer baseline rows than design matrix columns.
    #[error("insufficient baseline data: {rows} baseline rows for {columns} design columns")]
    InsufficientBaseline { rows: usize, columns: usize },

    /// The baseline design matrix is rank deficient.
    #[error("insufficient baseline data: design matrix is singular at column '{column}'")]
    SingularDesign { column: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing tabular data failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl TowtError {
    /// True for failures caused by too little (or degenerate) baseline data.
    ///
    /// These are reported per (account, season) and never abort a batch.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            TowtError::EmptyData
                | TowtError::InsufficientData { .. }
                | TowtError::InsufficientBaseline { .. }
                | TowtError::SingularDesign { .. }
        )
    }
}

impl From<csv::Error> for TowtError {
    fn from(err: csv::Error) -> Self {
        TowtError::Io(err.to_string())
    }
}

impl From<std::io::Error> for TowtError {
    fn from(err: std::io::Error) -> Self {
        TowtError::Io(err.to_string())
    }
}
