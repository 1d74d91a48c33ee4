//! Error types for vox-core operations.

use thiserror::Error;

/// Result type alias using [`CoreError`] as the error type.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while constructing or inspecting array types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Array rank is outside the supported 2..=4 range.
    #[error("array rank {0} outside supported range 2..=4")]
    RankOutOfRange(usize),

    /// Buffer length does not match the product of the shape extents.
    #[error("buffer of {actual} elements does not match shape {shape:?} ({expected} elements)")]
    ShapeMismatch {
        /// Extents the caller declared.
        shape: Vec<usize>,
        /// Element count the shape implies.
        expected: usize,
        /// Element count the buffer actually holds.
        actual: usize,
    },

    /// A shape axis has zero extent.
    #[error("axis {axis} of shape {shape:?} has zero extent")]
    EmptyAxis {
        /// Offending axis index.
        axis: usize,
        /// Full shape.
        shape: Vec<usize>,
    },

    /// Geometry vectors do not match the array rank.
    #[error("geometry of {actual} axes attached to rank-{rank} array")]
    GeometryMismatch {
        /// Array rank.
        rank: usize,
        /// Number of axes the geometry describes.
        actual: usize,
    },
}
