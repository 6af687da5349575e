use thiserror::Error;

use crate::{
    array::{chunk_grid::ChunkGridError, ArrayError, ArrayKind, DataType},
    array_subset::IncompatibleDimensionalityError,
};

use super::UnsupportedOperation;

/// Chunk manager errors.
///
/// Every variant except [`Unsupported`](ChunkManagerError::Unsupported) and [`Array`](ChunkManagerError::Array) is an invalid-argument error.
#[derive(Debug, Error)]
pub enum ChunkManagerError {
    /// An invalid chunk specification or invalid block starts.
    #[error("invalid chunks: {0}")]
    InvalidChunks(#[from] ChunkGridError),
    /// The number of sources and targets differ.
    #[error("number of sources ({sources}) and targets ({targets}) must match")]
    SourceTargetCountMismatch {
        /// The number of sources.
        sources: usize,
        /// The number of targets.
        targets: usize,
    },
    /// A source is not a chunked array of the manager's kind.
    #[error("source {index} is a {kind} array, only chunked arrays can be stored")]
    UnrecognizedSource {
        /// The position of the source.
        index: usize,
        /// The kind of the source.
        kind: ArrayKind,
    },
    /// An array is not a chunked array of the manager's kind.
    #[error("a {0} array is not a chunked array")]
    NotAChunkedArray(ArrayKind),
    /// A target has a different dimensionality to its source.
    #[error("target {0} has an incompatible dimensionality: {1}")]
    IncompatibleTargetDimensionality(usize, IncompatibleDimensionalityError),
    /// A target has a different data type to its source.
    #[error("target {0} has data type {2}, source has data type {1}")]
    IncompatibleDataType(usize, DataType, DataType),
    /// An index string does not have one character per axis of its array.
    #[error("index string {indices:?} does not match an array with {dimensionality} dimensions")]
    InvalidIndices {
        /// The index string.
        indices: String,
        /// The dimensionality of the array.
        dimensionality: usize,
    },
    /// The operation is not implemented for an eager backend.
    #[error("{0} is not implemented for an eager backend")]
    Unsupported(UnsupportedOperation),
    /// A backend failure.
    #[error(transparent)]
    Array(#[from] ArrayError),
}

impl ChunkManagerError {
    /// Returns true if the error is an invalid-argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        !matches!(self, Self::Unsupported(_) | Self::Array(_))
    }

    /// Returns true if the error is a not-implemented error.
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
