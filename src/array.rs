//! Array-like interfaces and the in-memory eager backend.
//!
//! An [`ArrayLike`] is anything with a shape, a [`DataType`], and support for ranged reads and writes addressed by an [`ArraySubset`].
//! Array-likes that belong to a distributed backend additionally report their per-axis block starts, which the
//! [`ChunkManager`](crate::chunk_manager::ChunkManager) turns into a [`ChunkGrid`].
//!
//! An [`ArrayBackend`] is the allocation side of a backend: it creates zero-filled arrays of its own [`ArrayKind`].
//!
//! [`MemoryBackend`] and [`MemoryArray`] are a complete in-process implementation of both interfaces.
//! They evaluate eagerly and simulate the block layout of an array distributed over a number of locales.
//!
//! ### Element Access
//! The [`ArrayLike`] methods read and write raw bytes in row-major order.
//! [`ArrayLikeExt`] adds variants with an `_elements` suffix for any [`Element`] type and, with the `ndarray` feature,
//! variants with an `_ndarray` suffix.

mod array_errors;
pub mod chunk_grid;
pub mod data_type;
mod element;
mod memory_array;

pub use self::{
    array_errors::ArrayError,
    chunk_grid::{BlockStarts, ChunkGrid},
    data_type::DataType,
    element::Element,
    memory_array::{MemoryArray, MemoryBackend},
};

use derive_more::Display;

use crate::array_subset::{ArraySubset, IncompatibleDimensionalityError};

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// The kind of an array-like.
///
/// A [`ChunkManager`](crate::chunk_manager::ChunkManager) recognises chunked arrays by comparing this tag with the kind of its backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
pub enum ArrayKind {
    /// A plain in-process array without a partition layout.
    #[display("host")]
    Host,
    /// An array held by a distributed eager backend.
    #[display("distributed")]
    Distributed,
}

/// An array-like object.
///
/// Implementations are handles to array state owned elsewhere (e.g. on a server), so writes take `&self`.
/// Each call is treated as atomic and blocking.
pub trait ArrayLike: core::fmt::Debug + Send + Sync {
    /// The kind tag of the array.
    fn kind(&self) -> ArrayKind;

    /// The shape of the array.
    fn shape(&self) -> &[u64];

    /// The data type of the array.
    fn data_type(&self) -> &DataType;

    /// The dimensionality of the array.
    fn dimensionality(&self) -> usize {
        self.shape().len()
    }

    /// The number of elements of the array.
    fn num_elements(&self) -> u64 {
        self.shape().iter().product()
    }

    /// The per-axis block start offsets of the array, excluding the final boundary.
    ///
    /// Returns [`None`] if the array has no partition layout.
    fn block_starts(&self) -> Option<BlockStarts>;

    /// Read the bytes of `array_subset` in row-major order.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the subset is incompatible with the array or the backend fails.
    fn retrieve_array_subset(&self, array_subset: &ArraySubset) -> Result<Vec<u8>, ArrayError>;

    /// Write `subset_bytes` (in row-major order) to `array_subset`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the subset or the bytes are incompatible with the array or the backend fails.
    fn store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError>;
}

/// Typed element access for all [`ArrayLike`] implementations.
pub trait ArrayLikeExt: ArrayLike {
    /// Read the elements of `array_subset` in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if `T` does not match the array data type,
    /// or any error from [`ArrayLike::retrieve_array_subset`].
    fn retrieve_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<T>, ArrayError> {
        T::validate_data_type(self.data_type())?;
        let bytes = self.retrieve_array_subset(array_subset)?;
        T::from_bytes(&bytes)
    }

    /// Read all elements of the array in row-major order.
    ///
    /// # Errors
    /// See [`retrieve_array_subset_elements`](ArrayLikeExt::retrieve_array_subset_elements).
    fn retrieve_array_elements<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        self.retrieve_array_subset_elements(&ArraySubset::new_with_shape(self.shape().to_vec()))
    }

    /// Write `elements` (in row-major order) to `array_subset`.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if `T` does not match the array data type,
    /// or any error from [`ArrayLike::store_array_subset`].
    fn store_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
        elements: &[T],
    ) -> Result<(), ArrayError> {
        T::validate_data_type(self.data_type())?;
        self.store_array_subset(array_subset, &T::to_bytes(elements))
    }

    #[cfg(feature = "ndarray")]
    /// Read the elements of `array_subset` into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// See [`retrieve_array_subset_elements`](ArrayLikeExt::retrieve_array_subset_elements).
    fn retrieve_array_subset_ndarray<T: Element>(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        let elements = self.retrieve_array_subset_elements::<T>(array_subset)?;
        let shape = iter_u64_to_usize(array_subset.shape().iter());
        ndarray::ArrayD::from_shape_vec(shape, elements)
            .map_err(|err| ArrayError::Other(err.to_string()))
    }

    #[cfg(feature = "ndarray")]
    /// Read the whole array into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// See [`retrieve_array_subset_elements`](ArrayLikeExt::retrieve_array_subset_elements).
    fn retrieve_array_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.retrieve_array_subset_ndarray(&ArraySubset::new_with_shape(self.shape().to_vec()))
    }
}

impl<A: ArrayLike + ?Sized> ArrayLikeExt for A {}

/// The allocation interface of an eager array backend.
///
/// This is the "array API namespace" of a backend as seen by a [`ChunkManager`](crate::chunk_manager::ChunkManager).
pub trait ArrayBackend {
    /// The array type created by the backend.
    type Array: ArrayLike;

    /// The kind of arrays created by the backend.
    fn array_kind(&self) -> ArrayKind;

    /// Create a zero-filled array with `shape` and `data_type`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the backend cannot allocate the array.
    fn zeros(&self, shape: ArrayShape, data_type: DataType) -> Result<Self::Array, ArrayError>;
}

/// Check that `array_subset` is compatible with an array of `array_shape`.
///
/// # Errors
/// Returns [`ArrayError::IncompatibleDimensionalityError`] or [`ArrayError::InvalidArraySubset`] if it is not.
pub(crate) fn validate_array_subset(
    array_subset: &ArraySubset,
    array_shape: &[u64],
) -> Result<(), ArrayError> {
    if array_subset.dimensionality() != array_shape.len() {
        Err(IncompatibleDimensionalityError::new(
            array_subset.dimensionality(),
            array_shape.len(),
        )
        .into())
    } else if !array_subset.inbounds(array_shape) {
        Err(ArrayError::InvalidArraySubset(
            array_subset.clone(),
            array_shape.to_vec(),
        ))
    } else {
        Ok(())
    }
}

/// Unravel a linearised index to ND indices.
#[must_use]
pub fn unravel_index(mut index: u64, shape: &[u64]) -> ArrayIndices {
    let mut indices = vec![0; shape.len()];
    for (indices_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev()) {
        *indices_i = index % dim;
        index /= dim;
    }
    indices
}

/// Ravel ND indices to a linearised index.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}

#[cfg(feature = "ndarray")]
fn iter_u64_to_usize<'a, I: Iterator<Item = &'a u64>>(iter: I) -> Vec<usize> {
    iter.map(|v| usize::try_from(*v).unwrap())
        .collect::<Vec<_>>()
}
