//! Array subsets.
//!
//! An [`ArraySubset`] is a hyperrectangular region of an array, defined by a start and a shape.
//! It is the block coordinate of this crate: every block of a [`ChunkGrid`](crate::array::chunk_grid::ChunkGrid)
//! is an array subset, and every ranged read or write against an [`ArrayLike`](crate::array::ArrayLike) takes one.
//!
//! This module also provides the row-major byte gather/scatter used by the in-memory backend:
//!  - [`ArraySubset::extract_bytes`] copies the bytes of a subset out of a whole-array buffer, and
//!  - [`ArraySubset::store_bytes`] copies subset bytes into a whole-array buffer.

use std::ops::Range;

use derive_more::Display;
use itertools::izip;
use thiserror::Error;

use crate::array::{ravel_indices, unravel_index, ArrayIndices, ArrayShape};

/// An array subset.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[display("start {start:?} shape {shape:?}")]
pub struct ArraySubset {
    /// The start of the array subset.
    start: ArrayIndices,
    /// The shape of the array subset.
    shape: ArrayShape,
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }

    /// The dimensionality that was provided.
    #[must_use]
    pub const fn got(&self) -> usize {
        self.0
    }

    /// The dimensionality that was expected.
    #[must_use]
    pub const fn expected(&self) -> usize {
        self.1
    }
}

/// An array extract bytes error.
#[derive(Debug, Error)]
#[error("array subset {0} is incompatible with array of shape {1:?} and element size {2}")]
pub struct ArrayExtractBytesError(ArraySubset, ArrayShape, usize);

/// An array store bytes error.
#[derive(Debug, Error)]
pub enum ArrayStoreBytesError {
    /// Invalid array shape.
    #[error("array shape {1:?} is incompatible with array subset {0}")]
    InvalidArrayShape(ArraySubset, ArrayShape),
    /// Invalid subset bytes.
    #[error("expected subset bytes to have length {1}, got {0}")]
    InvalidSubsetBytes(usize, usize),
    /// Invalid array bytes.
    #[error("expected array bytes to have length {1}, got {0}")]
    InvalidArrayBytes(usize, usize),
}

impl ArraySubset {
    /// Create a new empty array subset with `dimensionality`.
    #[must_use]
    pub fn new_empty(dimensionality: usize) -> Self {
        Self {
            start: vec![0; dimensionality],
            shape: vec![0; dimensionality],
        }
    }

    /// Create a new array subset from a list of [`Range`]s.
    ///
    /// Ranges with `end < start` produce an empty extent on that axis.
    #[must_use]
    pub fn new_with_ranges(ranges: &[Range<u64>]) -> Self {
        let start = ranges.iter().map(|range| range.start).collect();
        let shape = ranges
            .iter()
            .map(|range| range.end.saturating_sub(range.start))
            .collect();
        Self { start, shape }
    }

    /// Create a new array subset with `shape` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: ArrayShape) -> Self {
        Self {
            start: vec![0; shape.len()],
            shape,
        }
    }

    /// Create a new array subset.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleDimensionalityError`] if the lengths of `start` and `shape` do not match.
    pub fn new_with_start_shape(
        start: ArrayIndices,
        shape: ArrayShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == shape.len() {
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(
                start.len(),
                shape.len(),
            ))
        }
    }

    /// Create a new array subset.
    ///
    /// # Safety
    ///
    /// The length of `start` and `shape` must match.
    #[doc(hidden)]
    #[must_use]
    pub unsafe fn new_with_start_shape_unchecked(start: ArrayIndices, shape: ArrayShape) -> Self {
        debug_assert_eq!(start.len(), shape.len());
        Self { start, shape }
    }

    /// Create a new array subset from a start and end (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleDimensionalityError`] if the lengths of `start` and `end` do not match.
    pub fn new_with_start_end_exc(
        start: ArrayIndices,
        end: ArrayIndices,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == end.len() {
            let shape = std::iter::zip(&start, end)
                .map(|(&start, end)| end.saturating_sub(start))
                .collect();
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(start.len(), end.len()))
        }
    }

    /// Return the array subset as a vec of ranges.
    #[must_use]
    pub fn to_ranges(&self) -> Vec<Range<u64>> {
        std::iter::zip(&self.start, &self.shape)
            .map(|(&start, &size)| start..start + size)
            .collect()
    }

    /// Return the start of the array subset.
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Return the shape of the array subset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the array subset.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Return the end (exclusive) of the array subset.
    #[must_use]
    pub fn end_exc(&self) -> ArrayIndices {
        std::iter::zip(&self.start, &self.shape)
            .map(|(start, size)| start + size)
            .collect()
    }

    /// Return the number of elements of the array subset.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Return the number of elements of the array subset as a `usize`.
    ///
    /// # Panics
    ///
    /// Panics if [`num_elements()`](Self::num_elements()) is greater than [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).unwrap()
    }

    /// Returns true if the array subset contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&size| size == 0)
    }

    /// Returns true if the array subset is within the bounds of `array_shape`.
    #[must_use]
    pub fn inbounds(&self, array_shape: &[u64]) -> bool {
        self.dimensionality() == array_shape.len()
            && izip!(self.start(), self.shape(), array_shape)
                .all(|(start, size, shape)| start + size <= *shape)
    }

    /// Return the overlapping subset between this array subset and `subset_other`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `subset_other` does not match the dimensionality of this array subset.
    pub fn overlap(&self, subset_other: &Self) -> Result<Self, IncompatibleDimensionalityError> {
        if subset_other.dimensionality() != self.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                subset_other.dimensionality(),
                self.dimensionality(),
            ));
        }
        let ranges: Vec<_> = izip!(
            &self.start,
            &self.shape,
            subset_other.start(),
            subset_other.shape()
        )
        .map(|(start, size, other_start, other_size)| {
            let overlap_start = *std::cmp::max(start, other_start);
            let overlap_end = std::cmp::min(start + size, other_start + other_size);
            overlap_start..std::cmp::max(overlap_start, overlap_end)
        })
        .collect();
        Ok(Self::new_with_ranges(&ranges))
    }

    /// Return the contiguous runs of this subset in an array of `array_shape`.
    ///
    /// Each item is a (linearised element index, number of contiguous elements) pair, in row-major order.
    /// Trailing axes that the subset spans completely are merged into a single run.
    fn contiguous_runs<'a>(&'a self, array_shape: &'a [u64]) -> impl Iterator<Item = (u64, u64)> + 'a {
        let dimensionality = self.dimensionality();
        let (outer_axes, run_length) = if self.is_empty() {
            (0, 0)
        } else if dimensionality == 0 {
            (0, 1)
        } else {
            let mut axis = dimensionality - 1;
            let mut run_length = self.shape[axis];
            while axis > 0 && self.start[axis] == 0 && self.shape[axis] == array_shape[axis] {
                axis -= 1;
                run_length *= self.shape[axis];
            }
            (axis, run_length)
        };
        let outer_shape = &self.shape[..outer_axes];
        let num_runs = if run_length == 0 {
            0
        } else {
            outer_shape.iter().product::<u64>()
        };
        (0..num_runs).map(move |run| {
            let outer_indices = unravel_index(run, outer_shape);
            let indices: ArrayIndices = self
                .start
                .iter()
                .enumerate()
                .map(|(axis, start)| {
                    outer_indices
                        .get(axis)
                        .map_or(*start, |outer_index| start + outer_index)
                })
                .collect();
            (ravel_indices(&indices, array_shape), run_length)
        })
    }

    /// Return the bytes in this array subset from an array with shape `array_shape` and `element_size`.
    ///
    /// The output is in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayExtractBytesError`] if the length of `array_shape` does not match the array subset dimensionality,
    /// the length of `bytes` does not match `array_shape` and `element_size`,
    /// or the array subset is outside of the bounds of `array_shape`.
    ///
    /// # Panics
    ///
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<Vec<u8>, ArrayExtractBytesError> {
        let element_size_u64 = element_size as u64;
        if bytes.len() as u64 != array_shape.iter().product::<u64>() * element_size_u64
            || !self.inbounds(array_shape)
        {
            return Err(ArrayExtractBytesError(
                self.clone(),
                array_shape.to_vec(),
                element_size,
            ));
        }

        let mut bytes_subset = Vec::with_capacity(self.num_elements_usize() * element_size);
        for (array_index, contiguous_elements) in self.contiguous_runs(array_shape) {
            let byte_offset = usize::try_from(array_index * element_size_u64).unwrap();
            let byte_length = usize::try_from(contiguous_elements * element_size_u64).unwrap();
            bytes_subset.extend_from_slice(&bytes[byte_offset..byte_offset + byte_length]);
        }
        Ok(bytes_subset)
    }

    /// Store `subset_bytes` (in row-major order) into this array subset of `array_bytes`, an array with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayStoreBytesError`] if
    ///  - the array subset is out of bounds of `array_shape` or has a different dimensionality,
    ///  - `subset_bytes` does not have the size of the array subset, or
    ///  - `array_bytes` does not have the size of `array_shape`.
    ///
    /// # Panics
    ///
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn store_bytes(
        &self,
        subset_bytes: &[u8],
        array_bytes: &mut [u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<(), ArrayStoreBytesError> {
        if !self.inbounds(array_shape) {
            return Err(ArrayStoreBytesError::InvalidArrayShape(
                self.clone(),
                array_shape.to_vec(),
            ));
        }
        let expected_subset_len = self.num_elements_usize() * element_size;
        if subset_bytes.len() != expected_subset_len {
            return Err(ArrayStoreBytesError::InvalidSubsetBytes(
                subset_bytes.len(),
                expected_subset_len,
            ));
        }
        let expected_array_len =
            usize::try_from(array_shape.iter().product::<u64>()).unwrap() * element_size;
        if array_bytes.len() != expected_array_len {
            return Err(ArrayStoreBytesError::InvalidArrayBytes(
                array_bytes.len(),
                expected_array_len,
            ));
        }

        let element_size_u64 = element_size as u64;
        let mut subset_offset = 0;
        for (array_index, contiguous_elements) in self.contiguous_runs(array_shape) {
            let byte_offset = usize::try_from(array_index * element_size_u64).unwrap();
            let byte_length = usize::try_from(contiguous_elements * element_size_u64).unwrap();
            array_bytes[byte_offset..byte_offset + byte_length]
                .copy_from_slice(&subset_bytes[subset_offset..subset_offset + byte_length]);
            subset_offset += byte_length;
        }
        Ok(())
    }
}
