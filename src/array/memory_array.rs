//! An in-memory eager array backend.

use std::num::NonZeroUsize;

use parking_lot::RwLock;

use crate::array_subset::ArraySubset;

use super::{
    validate_array_subset, ArrayBackend, ArrayError, ArrayKind, ArrayLike, ArrayShape,
    BlockStarts, DataType, Element,
};

/// An in-memory eager array backend.
///
/// Arrays created by the backend are [`ArrayKind::Distributed`] and report the block layout they would have
/// if distributed over `num_locales` locales.
/// The locales are factored into a per-axis locale grid: prime factors of `num_locales` are taken largest first and each
/// is assigned to the axis which currently has the fewest locales (the first such axis on ties).
/// An axis of extent `n` split over `k` locales starts blocks at `⌊i·n/k⌋` for `i` in `0..k`, with duplicates removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBackend {
    num_locales: NonZeroUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN)
    }
}

fn prime_factors(mut value: usize) -> Vec<usize> {
    let mut factors = Vec::new();
    let mut divisor = 2;
    while divisor * divisor <= value {
        while value % divisor == 0 {
            factors.push(divisor);
            value /= divisor;
        }
        divisor += 1;
    }
    if value > 1 {
        factors.push(value);
    }
    factors
}

impl MemoryBackend {
    /// Create a new in-memory backend with `num_locales` locales.
    #[must_use]
    pub const fn new(num_locales: NonZeroUsize) -> Self {
        Self { num_locales }
    }

    /// The number of locales.
    #[must_use]
    pub const fn num_locales(&self) -> NonZeroUsize {
        self.num_locales
    }

    /// The number of locales assigned to each axis of an array with `dimensionality`.
    ///
    /// The product of the locale grid is the number of locales, except for a zero-dimensional array which has an empty locale grid.
    #[must_use]
    pub fn locale_grid(&self, dimensionality: usize) -> Vec<u64> {
        let mut locale_grid = vec![1u64; dimensionality];
        if dimensionality == 0 {
            return locale_grid;
        }
        for factor in prime_factors(self.num_locales.get()).into_iter().rev() {
            let axis = locale_grid
                .iter()
                .enumerate()
                .min_by_key(|(_, &locales)| locales)
                .map_or(0, |(axis, _)| axis);
            locale_grid[axis] *= factor as u64;
        }
        locale_grid
    }

    /// The block starts of an array with `shape` created by this backend.
    #[must_use]
    pub fn block_starts(&self, shape: &[u64]) -> BlockStarts {
        std::iter::zip(shape, self.locale_grid(shape.len()))
            .map(|(&extent, locales)| {
                if extent == 0 {
                    return vec![];
                }
                let mut starts: Vec<u64> = (0..locales)
                    .map(|locale| {
                        u64::try_from(u128::from(locale) * u128::from(extent) / u128::from(locales))
                            .unwrap_or(u64::MAX)
                    })
                    .collect();
                starts.dedup();
                starts
            })
            .collect()
    }

    /// Create an array with `shape` holding `elements` in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidBytesInputSize`] if the number of elements does not match `shape`.
    pub fn asarray<T: Element>(
        &self,
        shape: ArrayShape,
        elements: &[T],
    ) -> Result<MemoryArray, ArrayError> {
        let block_starts = self.block_starts(&shape);
        let array = MemoryArray::new_with_bytes(
            ArrayKind::Distributed,
            shape,
            T::DATA_TYPE,
            T::to_bytes(elements),
        )?;
        Ok(array.with_block_starts(block_starts))
    }

    #[cfg(feature = "ndarray")]
    /// Create an array from an [`ndarray::ArrayViewD`].
    ///
    /// # Errors
    /// See [`asarray`](MemoryBackend::asarray).
    pub fn from_ndarray<T: Element>(
        &self,
        array: &ndarray::ArrayViewD<T>,
    ) -> Result<MemoryArray, ArrayError> {
        let shape = array.shape().iter().map(|&extent| extent as u64).collect();
        let elements: Vec<T> = array.iter().copied().collect();
        self.asarray(shape, &elements)
    }
}

impl ArrayBackend for MemoryBackend {
    type Array = MemoryArray;

    fn array_kind(&self) -> ArrayKind {
        ArrayKind::Distributed
    }

    fn zeros(&self, shape: ArrayShape, data_type: DataType) -> Result<MemoryArray, ArrayError> {
        let block_starts = self.block_starts(&shape);
        Ok(MemoryArray::new(ArrayKind::Distributed, shape, data_type)?.with_block_starts(block_starts))
    }
}

/// An in-memory array.
///
/// Elements are held as row-major bytes.
/// Writes go through `&self` since the array is a handle to backend-owned state.
#[derive(Debug)]
pub struct MemoryArray {
    kind: ArrayKind,
    shape: ArrayShape,
    data_type: DataType,
    block_starts: Option<BlockStarts>,
    bytes: RwLock<Vec<u8>>,
}

fn array_size(shape: &[u64], data_type: DataType) -> Result<usize, ArrayError> {
    shape
        .iter()
        .try_fold(data_type.size() as u64, |size, &extent| size.checked_mul(extent))
        .and_then(|size| usize::try_from(size).ok())
        .ok_or_else(|| ArrayError::Other(format!("array with shape {shape:?} is too large")))
}

impl MemoryArray {
    /// Create a zero-filled array without block starts.
    ///
    /// # Errors
    /// Returns [`ArrayError::Other`] if the array size exceeds [`usize::MAX`].
    pub fn new(kind: ArrayKind, shape: ArrayShape, data_type: DataType) -> Result<Self, ArrayError> {
        let size = array_size(&shape, data_type)?;
        Ok(Self {
            kind,
            shape,
            data_type,
            block_starts: None,
            bytes: RwLock::new(vec![0; size]),
        })
    }

    /// Create an array without block starts holding `bytes` in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidBytesInputSize`] if the length of `bytes` does not match `shape` and `data_type`.
    pub fn new_with_bytes(
        kind: ArrayKind,
        shape: ArrayShape,
        data_type: DataType,
        bytes: Vec<u8>,
    ) -> Result<Self, ArrayError> {
        let size = array_size(&shape, data_type)?;
        if bytes.len() != size {
            return Err(ArrayError::InvalidBytesInputSize(bytes.len(), size as u64));
        }
        Ok(Self {
            kind,
            shape,
            data_type,
            block_starts: None,
            bytes: RwLock::new(bytes),
        })
    }

    /// Create a [`ArrayKind::Host`] array holding `elements` in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidBytesInputSize`] if the number of elements does not match `shape`.
    pub fn new_host_with_elements<T: Element>(
        shape: ArrayShape,
        elements: &[T],
    ) -> Result<Self, ArrayError> {
        Self::new_with_bytes(ArrayKind::Host, shape, T::DATA_TYPE, T::to_bytes(elements))
    }

    /// Attach `block_starts` to the array.
    ///
    /// The block starts are reported as-is, they are not validated.
    #[must_use]
    pub fn with_block_starts(mut self, block_starts: BlockStarts) -> Self {
        self.block_starts = Some(block_starts);
        self
    }
}

impl ArrayLike for MemoryArray {
    fn kind(&self) -> ArrayKind {
        self.kind
    }

    fn shape(&self) -> &[u64] {
        &self.shape
    }

    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn block_starts(&self) -> Option<BlockStarts> {
        self.block_starts.clone()
    }

    fn retrieve_array_subset(&self, array_subset: &ArraySubset) -> Result<Vec<u8>, ArrayError> {
        validate_array_subset(array_subset, &self.shape)?;
        let bytes = self.bytes.read();
        Ok(array_subset.extract_bytes(&bytes, &self.shape, self.data_type.size())?)
    }

    fn store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError> {
        validate_array_subset(array_subset, &self.shape)?;
        let expected_size = array_subset.num_elements() * self.data_type.size() as u64;
        if subset_bytes.len() as u64 != expected_size {
            return Err(ArrayError::InvalidBytesInputSize(
                subset_bytes.len(),
                expected_size,
            ));
        }
        let mut bytes = self.bytes.write();
        Ok(array_subset.store_bytes(subset_bytes, &mut bytes, &self.shape, self.data_type.size())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayLikeExt;

    fn backend(num_locales: usize) -> MemoryBackend {
        MemoryBackend::new(NonZeroUsize::new(num_locales).unwrap())
    }

    #[test]
    fn memory_backend_prime_factors() {
        assert_eq!(prime_factors(1), Vec::<usize>::new());
        assert_eq!(prime_factors(12), vec![2, 2, 3]);
        assert_eq!(prime_factors(13), vec![13]);
    }

    #[test]
    fn memory_backend_locale_grid() {
        assert_eq!(backend(1).locale_grid(2), vec![1, 1]);
        assert_eq!(backend(4).locale_grid(2), vec![2, 2]);
        assert_eq!(backend(6).locale_grid(2), vec![3, 2]);
        assert_eq!(backend(12).locale_grid(3), vec![3, 2, 2]);
        assert_eq!(backend(8).locale_grid(1), vec![8]);
        assert_eq!(backend(8).locale_grid(0), Vec::<u64>::new());
    }

    #[test]
    fn memory_backend_block_starts() {
        assert_eq!(backend(1).block_starts(&[4, 6]), vec![vec![0], vec![0]]);
        assert_eq!(backend(4).block_starts(&[4, 6]), vec![vec![0, 2], vec![0, 3]]);
        assert_eq!(backend(3).block_starts(&[10]), vec![vec![0, 3, 6]]);
        // More locales than elements
        assert_eq!(backend(4).block_starts(&[2]), vec![vec![0, 1]]);
        assert_eq!(backend(2).block_starts(&[0, 3]), vec![vec![], vec![0]]);
    }

    #[test]
    fn memory_array_zeros() {
        let array = backend(2).zeros(vec![2, 3], DataType::Int32).unwrap();
        assert_eq!(array.kind(), ArrayKind::Distributed);
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.num_elements(), 6);
        assert_eq!(array.block_starts(), Some(vec![vec![0, 1], vec![0]]));
        assert_eq!(array.retrieve_array_elements::<i32>().unwrap(), vec![0; 6]);
    }

    #[test]
    fn memory_array_retrieve_store() {
        let array = backend(1)
            .asarray(vec![2, 3], &[0u16, 1, 2, 3, 4, 5])
            .unwrap();
        let subset = ArraySubset::new_with_ranges(&[0..2, 1..3]);
        assert_eq!(
            array.retrieve_array_subset_elements::<u16>(&subset).unwrap(),
            vec![1, 2, 4, 5]
        );
        array
            .store_array_subset_elements::<u16>(&subset, &[10, 20, 40, 50])
            .unwrap();
        assert_eq!(
            array.retrieve_array_elements::<u16>().unwrap(),
            vec![0, 10, 20, 3, 40, 50]
        );

        assert!(matches!(
            array.store_array_subset_elements::<u16>(&subset, &[1, 2, 3]),
            Err(ArrayError::InvalidBytesInputSize(6, 8))
        ));
        assert!(matches!(
            array.retrieve_array_subset_elements::<i16>(&subset),
            Err(ArrayError::IncompatibleElementType(..))
        ));
        assert!(matches!(
            array.retrieve_array_subset(&ArraySubset::new_with_ranges(&[0..3, 0..1])),
            Err(ArrayError::InvalidArraySubset(..))
        ));
    }

    #[test]
    fn memory_array_host() {
        let array = MemoryArray::new_host_with_elements(vec![3], &[true, false, true]).unwrap();
        assert_eq!(array.kind(), ArrayKind::Host);
        assert_eq!(array.data_type(), &DataType::Bool);
        assert_eq!(array.block_starts(), None);
        assert!(MemoryArray::new_host_with_elements(vec![2], &[1u8]).is_err());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn memory_array_ndarray() {
        let elements = ndarray::Array2::from_shape_fn((3, 4), |(i, j)| (i * 4 + j) as f32);
        let array = backend(2).from_ndarray(&elements.view().into_dyn()).unwrap();
        assert_eq!(array.shape(), &[3, 4]);
        assert_eq!(array.retrieve_array_ndarray::<f32>().unwrap(), elements.into_dyn());
    }
}
