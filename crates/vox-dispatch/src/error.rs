//! The dispatch failure taxonomy.
//!
//! Every failure is terminal for the current invocation and identifies
//! which of filter name, rank, element type, or parameter triggered it,
//! since callers routinely retry with corrected arguments.

use crate::id::FilterId;
use thiserror::Error;
use vox_core::{CoreError, ElementType};

/// Result type alias using [`DispatchError`] as the error type.
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced by the dispatch core.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The filter name matches no canonical name or alias.
    #[error("unknown filter {0:?}")]
    UnknownFilter(String),

    /// The (filter, rank, element type) triple has no specialization.
    #[error("filter '{filter}' does not support rank-{rank} {element} input: {reason}")]
    UnsupportedCombination {
        /// Filter the caller selected.
        filter: FilterId,
        /// Rank of the primary input.
        rank: usize,
        /// Element type of the primary input.
        element: ElementType,
        /// Which constraint rejected the call.
        reason: &'static str,
    },

    /// Too few or too many positional arguments.
    #[error(
        "filter '{filter}' takes between {min_expected} and {max_expected} arguments \
         (filter name and image included), got {actual}"
    )]
    Arity {
        /// Filter the caller selected.
        filter: FilterId,
        /// Minimum argument count, counting the name and primary image.
        min_expected: usize,
        /// Maximum argument count, counting the name and primary image.
        max_expected: usize,
        /// What the caller actually supplied, counting name and image.
        actual: usize,
    },

    /// A supplied value could not be coerced to the parameter's kind.
    #[error("parameter '{parameter}' expects {expected}, got {actual}")]
    Coercion {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The kind the parameter accepts.
        expected: String,
        /// Description of the rejected value.
        actual: String,
    },

    /// Primary input rank outside the supported 2..=4 range.
    #[error("array rank {0} outside supported range 2..=4")]
    RankOutOfRange(usize),

    /// The selected specialization failed after dispatch; opaque to the
    /// core.
    #[error("algorithm failure: {0}")]
    Algorithm(String),
}

impl From<CoreError> for DispatchError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::RankOutOfRange(r) => Self::RankOutOfRange(r),
            other => Self::Algorithm(other.to_string()),
        }
    }
}
