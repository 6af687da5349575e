use thiserror::Error;

use crate::array_subset::{
    ArrayExtractBytesError, ArraySubset, ArrayStoreBytesError, IncompatibleDimensionalityError,
};

use super::{ArrayShape, DataType};

/// Array errors.
///
/// These are the errors of the downstream array contract.
/// The [`ChunkManager`](crate::chunk_manager::ChunkManager) propagates them unchanged.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionalityError(#[from] IncompatibleDimensionalityError),
    /// Incompatible array subset.
    #[error("array subset {0} is not compatible with array shape {1:?}")]
    InvalidArraySubset(ArraySubset, ArrayShape),
    /// An unexpected bytes input size.
    #[error("got bytes with size {0:?}, expected {1:?}")]
    InvalidBytesInputSize(usize, u64),
    /// Incompatible element type.
    #[error("incompatible element type {0}, array data type is {1}")]
    IncompatibleElementType(DataType, DataType),
    /// An invalid boolean value.
    #[error("invalid boolean value {0}, expected 0 or 1")]
    InvalidBoolValue(u8),
    /// Extracting subset bytes failed.
    #[error(transparent)]
    ExtractBytesError(#[from] ArrayExtractBytesError),
    /// Storing subset bytes failed.
    #[error(transparent)]
    StoreBytesError(#[from] ArrayStoreBytesError),
    /// A backend specific error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for ArrayError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for ArrayError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
