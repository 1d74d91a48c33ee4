//! Error types for filter execution.

use thiserror::Error;

/// Error type for filter execution.
#[derive(Error, Debug)]
pub enum FilterError {
    /// A parameter value is outside the algorithm's domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input does not satisfy the algorithm's preconditions.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The iteration diverged or failed to make progress.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Result type for filter execution.
pub type FilterResult<T> = Result<T, FilterError>;
