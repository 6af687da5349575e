//! Chunk grids.
//!
//! A [`ChunkGrid`] partitions each axis of an array into contiguous half-open ranges.
//! It is stored as one ordered list of boundaries per axis: for an axis with boundaries `b_0, b_1, …, b_k`,
//! the chunks on that axis are `[b_0, b_1), [b_1, b_2), …, [b_{k-1}, b_k)`.
//!
//! A grid is derived either
//!  - from the [block starts](BlockStarts) reported by a distributed array ([`ChunkGrid::from_block_starts`]), or
//!  - from a [`ChunkSpec`] and an array shape ([`ChunkGrid::from_chunk_spec`] / [`normalize_chunks`]).
//!
//! The blocks of a grid are the Cartesian product of the per-axis ranges, see [`Blocks`].
//!
//! Grids are plain values. Deriving one performs no I/O and never touches a backend.

mod blocks;
mod chunk_spec;

pub use blocks::{enumerate_blocks, Blocks, BlocksIterator};
pub use chunk_spec::{ChunkDimensionSpec, ChunkSpec, NonZeroError};

use std::num::NonZeroU64;

use thiserror::Error;

use crate::array_subset::{ArraySubset, IncompatibleDimensionalityError};

use super::{ArrayIndices, ArrayShape};

/// Per-axis block start offsets, excluding the final boundary of each axis.
pub type BlockStarts = Vec<Vec<u64>>;

/// A chunk grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkGrid {
    boundaries: Vec<Vec<u64>>,
}

/// Chunk grid errors.
#[derive(Debug, Error)]
pub enum ChunkGridError {
    /// The number of axes of a specification does not match the array dimensionality.
    #[error("number of dimensions in data and chunks must match, or chunks must be a single value: {0}")]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// Explicit chunk widths do not sum to the axis extent.
    #[error("chunk widths {widths:?} on axis {axis} sum to {sum}, expected the axis extent {extent}")]
    InvalidChunkSizes {
        /// The axis.
        axis: usize,
        /// The chunk widths.
        widths: Vec<u64>,
        /// The sum of the chunk widths, saturating at [`u64::MAX`].
        sum: u64,
        /// The axis extent.
        extent: u64,
    },
    /// Boundaries that violate the chunk grid invariant.
    #[error(transparent)]
    InvalidBoundaries(#[from] InvalidChunkGridError),
}

/// An invalid chunk grid error.
///
/// Boundaries must start at 0, be strictly increasing, and end at the axis extent.
#[derive(Clone, Debug, Error)]
#[error("invalid chunk grid boundaries {boundaries:?} on axis {axis} with extent {extent}")]
pub struct InvalidChunkGridError {
    axis: usize,
    boundaries: Vec<u64>,
    extent: u64,
}

impl InvalidChunkGridError {
    /// The offending axis.
    #[must_use]
    pub const fn axis(&self) -> usize {
        self.axis
    }
}

/// An invalid chunk indices error.
#[derive(Debug, Error)]
#[error("chunk grid indices {0:?} are invalid for a chunk grid with shape {1:?}")]
pub struct InvalidChunkGridIndicesError(ArrayIndices, ArrayShape);

/// An invalid array indices error.
#[derive(Debug, Error)]
#[error("array indices {0:?} are incompatible with the array shape {1:?}")]
pub struct InvalidArrayIndicesError(ArrayIndices, ArrayShape);

/// Returns true if `boundaries` partition `[0, extent)` into non-empty ranges.
fn is_valid_axis(boundaries: &[u64], extent: u64) -> bool {
    boundaries.first() == Some(&0)
        && boundaries.last() == Some(&extent)
        && boundaries.windows(2).all(|pair| pair[0] < pair[1])
}

fn fixed_boundaries(width: NonZeroU64, extent: u64) -> Vec<u64> {
    let width = width.get();
    (0..extent.div_ceil(width))
        .map(|chunk| chunk * width)
        .chain(std::iter::once(extent))
        .collect()
}

/// The running sums of `widths` preceded by zero, or [`None`] if a sum overflows.
fn cumulative_boundaries(mut widths: impl ExactSizeIterator<Item = u64>) -> Option<Vec<u64>> {
    let mut boundaries = Vec::with_capacity(widths.len() + 1);
    boundaries.push(0);
    widths.try_fold(0u64, |offset, width| {
        let offset = offset.checked_add(width)?;
        boundaries.push(offset);
        Some(offset)
    })?;
    Some(boundaries)
}

fn varying_boundaries(
    axis: usize,
    widths: &[NonZeroU64],
    extent: u64,
) -> Result<Vec<u64>, ChunkGridError> {
    let boundaries = cumulative_boundaries(widths.iter().map(|width| width.get()));
    let sum = boundaries
        .as_ref()
        .and_then(|boundaries| boundaries.last().copied())
        .unwrap_or(u64::MAX);
    if let Some(boundaries) = boundaries.filter(|_| sum == extent) {
        Ok(boundaries)
    } else {
        Err(ChunkGridError::InvalidChunkSizes {
            axis,
            widths: widths.iter().map(|width| width.get()).collect(),
            sum,
            extent,
        })
    }
}

fn full_boundaries(extent: u64) -> Vec<u64> {
    if extent == 0 {
        vec![0]
    } else {
        vec![0, extent]
    }
}

fn dimension_boundaries(
    axis: usize,
    dimension: &ChunkDimensionSpec,
    extent: u64,
) -> Result<Vec<u64>, ChunkGridError> {
    match dimension {
        ChunkDimensionSpec::Fixed(width) => Ok(fixed_boundaries(*width, extent)),
        ChunkDimensionSpec::Varying(widths) => varying_boundaries(axis, widths, extent),
        ChunkDimensionSpec::Full => Ok(full_boundaries(extent)),
    }
}

impl ChunkGrid {
    /// Create a chunk grid from per-axis `boundaries`.
    ///
    /// The array shape is implied by the last boundary of each axis.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridError`] if the boundaries of an axis are empty, do not start at 0, or are not strictly increasing.
    pub fn new(boundaries: Vec<Vec<u64>>) -> Result<Self, InvalidChunkGridError> {
        for (axis, axis_boundaries) in boundaries.iter().enumerate() {
            let extent = axis_boundaries.last().copied().unwrap_or_default();
            if !is_valid_axis(axis_boundaries, extent) {
                return Err(InvalidChunkGridError {
                    axis,
                    boundaries: axis_boundaries.clone(),
                    extent,
                });
            }
        }
        Ok(Self { boundaries })
    }

    /// Create a chunk grid from per-axis `boundaries` without validation.
    ///
    /// Zero-width or decreasing chunks in an unvalidated grid yield empty blocks.
    #[must_use]
    pub fn new_unchecked(boundaries: Vec<Vec<u64>>) -> Self {
        Self { boundaries }
    }

    /// Create a chunk grid from the `block_starts` of an array with `array_shape`.
    ///
    /// The extent of each axis is appended to the block starts of that axis.
    ///
    /// # Errors
    /// Returns [`ChunkGridError::IncompatibleDimensionality`] if the number of axes of `block_starts` and `array_shape` differ,
    /// or [`ChunkGridError::InvalidBoundaries`] if the resulting boundaries violate the chunk grid invariant.
    pub fn from_block_starts(
        block_starts: &[Vec<u64>],
        array_shape: &[u64],
    ) -> Result<Self, ChunkGridError> {
        let chunk_grid = Self::from_block_starts_unchecked(block_starts, array_shape)?;
        for (axis, (axis_boundaries, &extent)) in
            std::iter::zip(&chunk_grid.boundaries, array_shape).enumerate()
        {
            if !is_valid_axis(axis_boundaries, extent) {
                return Err(InvalidChunkGridError {
                    axis,
                    boundaries: axis_boundaries.clone(),
                    extent,
                }
                .into());
            }
        }
        Ok(chunk_grid)
    }

    /// Create a chunk grid from the `block_starts` of an array with `array_shape` without validating the boundaries.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the number of axes of `block_starts` and `array_shape` differ.
    pub fn from_block_starts_unchecked(
        block_starts: &[Vec<u64>],
        array_shape: &[u64],
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if block_starts.len() != array_shape.len() {
            return Err(IncompatibleDimensionalityError::new(
                block_starts.len(),
                array_shape.len(),
            ));
        }
        let boundaries = std::iter::zip(block_starts, array_shape)
            .map(|(starts, &extent)| {
                let mut axis_boundaries = Vec::with_capacity(starts.len() + 1);
                axis_boundaries.extend_from_slice(starts);
                axis_boundaries.push(extent);
                axis_boundaries
            })
            .collect();
        Ok(Self { boundaries })
    }

    /// Create a chunk grid from a [`ChunkSpec`] and an array shape.
    ///
    /// A uniform width applies to every axis.
    /// A per-axis specification must have one entry per axis, or a single entry which is broadcast to every axis.
    ///
    /// # Errors
    /// Returns [`ChunkGridError::IncompatibleDimensionality`] if a per-axis specification has the wrong length,
    /// or [`ChunkGridError::InvalidChunkSizes`] if explicit widths do not sum to the axis extent.
    pub fn from_chunk_spec(
        chunk_spec: &ChunkSpec,
        array_shape: &[u64],
    ) -> Result<Self, ChunkGridError> {
        let boundaries = match chunk_spec {
            ChunkSpec::Uniform(width) => array_shape
                .iter()
                .map(|&extent| fixed_boundaries(*width, extent))
                .collect(),
            ChunkSpec::PerAxis(dimensions) => match dimensions.as_slice() {
                [dimension] => array_shape
                    .iter()
                    .enumerate()
                    .map(|(axis, &extent)| dimension_boundaries(axis, dimension, extent))
                    .collect::<Result<_, _>>()?,
                dimensions if dimensions.len() == array_shape.len() => {
                    std::iter::zip(dimensions, array_shape)
                        .enumerate()
                        .map(|(axis, (dimension, &extent))| {
                            dimension_boundaries(axis, dimension, extent)
                        })
                        .collect::<Result<_, _>>()?
                }
                dimensions => {
                    return Err(IncompatibleDimensionalityError::new(
                        dimensions.len(),
                        array_shape.len(),
                    )
                    .into())
                }
            },
        };
        Ok(Self { boundaries })
    }

    /// Create a chunk grid from explicit per-axis chunk widths (the normalised "widths" form).
    ///
    /// # Errors
    /// Returns a [`ChunkGridError`] if the number of axes does not match `array_shape`, a width is zero,
    /// or the widths of an axis do not sum to its extent.
    pub fn from_chunk_sizes(
        chunk_sizes: &[Vec<u64>],
        array_shape: &[u64],
    ) -> Result<Self, ChunkGridError> {
        if chunk_sizes.len() != array_shape.len() {
            return Err(
                IncompatibleDimensionalityError::new(chunk_sizes.len(), array_shape.len()).into(),
            );
        }
        let boundaries = std::iter::zip(chunk_sizes, array_shape)
            .enumerate()
            .map(|(axis, (widths, &extent))| {
                let Some(boundaries) = cumulative_boundaries(widths.iter().copied()) else {
                    return Err(ChunkGridError::InvalidChunkSizes {
                        axis,
                        widths: widths.clone(),
                        sum: u64::MAX,
                        extent,
                    });
                };
                if widths.contains(&0) {
                    Err(InvalidChunkGridError {
                        axis,
                        boundaries,
                        extent,
                    }
                    .into())
                } else if boundaries.last() != Some(&extent) {
                    Err(ChunkGridError::InvalidChunkSizes {
                        axis,
                        widths: widths.clone(),
                        sum: boundaries.last().copied().unwrap_or_default(),
                        extent,
                    })
                } else {
                    Ok(boundaries)
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { boundaries })
    }

    /// The dimensionality of the grid.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.boundaries.len()
    }

    /// The per-axis boundaries.
    #[must_use]
    pub fn boundaries(&self) -> &[Vec<u64>] {
        &self.boundaries
    }

    /// The shape of the array partitioned by the grid.
    #[must_use]
    pub fn array_shape(&self) -> ArrayShape {
        self.boundaries
            .iter()
            .map(|axis_boundaries| axis_boundaries.last().copied().unwrap_or_default())
            .collect()
    }

    /// The grid shape (i.e. number of chunks per axis).
    #[must_use]
    pub fn grid_shape(&self) -> ArrayShape {
        self.boundaries
            .iter()
            .map(|axis_boundaries| axis_boundaries.len().saturating_sub(1) as u64)
            .collect()
    }

    /// The total number of blocks.
    #[must_use]
    pub fn num_blocks(&self) -> u64 {
        self.grid_shape().iter().product()
    }

    /// The per-axis chunk widths.
    #[must_use]
    pub fn chunk_sizes(&self) -> Vec<Vec<u64>> {
        self.boundaries
            .iter()
            .map(|axis_boundaries| {
                axis_boundaries
                    .windows(2)
                    .map(|pair| pair[1].saturating_sub(pair[0]))
                    .collect()
            })
            .collect()
    }

    /// The per-axis block starts (the boundaries without the final extent).
    #[must_use]
    pub fn block_starts(&self) -> BlockStarts {
        self.boundaries
            .iter()
            .map(|axis_boundaries| {
                axis_boundaries[..axis_boundaries.len().saturating_sub(1)].to_vec()
            })
            .collect()
    }

    /// Return the [`Blocks`] of the grid.
    #[must_use]
    pub fn blocks(&self) -> Blocks {
        Blocks::new(self)
    }

    /// Return the [`ArraySubset`] of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridIndicesError`] if the length of `chunk_indices` does not match the dimensionality of the grid
    /// or the indices are out of bounds of the grid shape.
    pub fn subset(&self, chunk_indices: &[u64]) -> Result<ArraySubset, InvalidChunkGridIndicesError> {
        let grid_shape = self.grid_shape();
        if chunk_indices.len() == grid_shape.len()
            && std::iter::zip(chunk_indices, &grid_shape).all(|(index, shape)| index < shape)
        {
            let ranges: Vec<_> = std::iter::zip(chunk_indices, &self.boundaries)
                .map(|(&index, axis_boundaries)| {
                    let index = usize::try_from(index).unwrap_or(usize::MAX);
                    axis_boundaries[index]..axis_boundaries[index + 1]
                })
                .collect();
            Ok(ArraySubset::new_with_ranges(&ranges))
        } else {
            Err(InvalidChunkGridIndicesError(
                chunk_indices.to_vec(),
                grid_shape,
            ))
        }
    }

    /// The indices of the chunk which holds the element at `array_indices`.
    ///
    /// # Errors
    /// Returns [`InvalidArrayIndicesError`] if the length of `array_indices` does not match the dimensionality of the grid
    /// or the indices are out of bounds of the array shape.
    pub fn chunk_indices(
        &self,
        array_indices: &[u64],
    ) -> Result<ArrayIndices, InvalidArrayIndicesError> {
        let array_shape = self.array_shape();
        if array_indices.len() == array_shape.len()
            && std::iter::zip(array_indices, &array_shape).all(|(index, shape)| index < shape)
        {
            Ok(std::iter::zip(array_indices, &self.boundaries)
                .map(|(index, axis_boundaries)| {
                    let partition = axis_boundaries.partition_point(|boundary| boundary <= index);
                    partition.saturating_sub(1) as u64
                })
                .collect())
        } else {
            Err(InvalidArrayIndicesError(
                array_indices.to_vec(),
                array_shape,
            ))
        }
    }
}

/// Normalise `chunks` against an array with `array_shape`.
///
/// Without a specification, every axis is a single chunk.
///
/// # Errors
/// See [`ChunkGrid::from_chunk_spec`].
pub fn normalize_chunks(
    chunks: Option<&ChunkSpec>,
    array_shape: &[u64],
) -> Result<ChunkGrid, ChunkGridError> {
    match chunks {
        Some(chunk_spec) => ChunkGrid::from_chunk_spec(chunk_spec, array_shape),
        None => Ok(ChunkGrid {
            boundaries: array_shape.iter().map(|&extent| full_boundaries(extent)).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_grid_uniform() {
        let chunk_spec = ChunkSpec::try_from(2u64).unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 6]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4], vec![0, 2, 4, 6]]);
        assert_eq!(chunk_grid.grid_shape(), vec![2, 3]);
        assert_eq!(chunk_grid.num_blocks(), 6);
        assert_eq!(chunk_grid.array_shape(), vec![4, 6]);
    }

    #[test]
    fn chunk_grid_uniform_remainder() {
        let chunk_spec = ChunkSpec::try_from(2u64).unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[5, 1]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4, 5], vec![0, 1]]);
        assert_eq!(chunk_grid.chunk_sizes(), vec![vec![2, 2, 1], vec![1]]);
    }

    #[test]
    fn chunk_grid_per_axis() {
        let chunk_spec = ChunkSpec::try_from([2u64, 3]).unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 7]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4], vec![0, 3, 6, 7]]);

        // A single entry is broadcast to every axis
        let chunk_spec = ChunkSpec::try_from([3u64]).unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 7, 3]).unwrap();
        assert_eq!(
            chunk_grid.boundaries(),
            &[vec![0, 3, 4], vec![0, 3, 6, 7], vec![0, 3]]
        );
    }

    #[test]
    fn chunk_grid_per_axis_incompatible_dimensionality() {
        let chunk_spec = ChunkSpec::try_from([2u64, 3]).unwrap();
        assert!(matches!(
            ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 6, 8]),
            Err(ChunkGridError::IncompatibleDimensionality(_))
        ));
        let chunk_spec = ChunkSpec::PerAxis(vec![]);
        assert!(ChunkGrid::from_chunk_spec(&chunk_spec, &[4]).is_err());
    }

    #[test]
    fn chunk_grid_varying_and_full() {
        let chunk_spec: ChunkSpec = serde_json::from_str("[[1, 3], null]").unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 5]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 1, 4], vec![0, 5]]);

        let chunk_spec: ChunkSpec = serde_json::from_str("[[1, 2], 2]").unwrap();
        assert!(matches!(
            ChunkGrid::from_chunk_spec(&chunk_spec, &[4, 5]),
            Err(ChunkGridError::InvalidChunkSizes {
                axis: 0,
                sum: 3,
                extent: 4,
                ..
            })
        ));
    }

    #[test]
    fn chunk_grid_varying_overflow() {
        let chunk_spec: ChunkSpec = serde_json::from_str("[[18446744073709551615, 6]]").unwrap();
        assert!(matches!(
            ChunkGrid::from_chunk_spec(&chunk_spec, &[5]),
            Err(ChunkGridError::InvalidChunkSizes {
                axis: 0,
                sum: u64::MAX,
                extent: 5,
                ..
            })
        ));
        let chunk_spec: ChunkSpec =
            serde_json::from_str("[[18446744073709551615, 1, 18446744073709551615]]").unwrap();
        assert!(ChunkGrid::from_chunk_spec(&chunk_spec, &[u64::MAX]).is_err());
    }

    #[test]
    fn chunk_grid_zero_extent() {
        let chunk_spec = ChunkSpec::try_from(2u64).unwrap();
        let chunk_grid = ChunkGrid::from_chunk_spec(&chunk_spec, &[0, 4]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0], vec![0, 2, 4]]);
        assert_eq!(chunk_grid.num_blocks(), 0);
    }

    #[test]
    fn chunk_grid_from_block_starts() {
        let chunk_grid = ChunkGrid::from_block_starts(&[vec![0, 2], vec![0, 3]], &[4, 6]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4], vec![0, 3, 6]]);
        assert_eq!(chunk_grid.block_starts(), vec![vec![0, 2], vec![0, 3]]);

        assert!(matches!(
            ChunkGrid::from_block_starts(&[vec![0, 2]], &[4, 6]),
            Err(ChunkGridError::IncompatibleDimensionality(_))
        ));
        // Does not start at zero
        assert!(matches!(
            ChunkGrid::from_block_starts(&[vec![1, 2]], &[4]),
            Err(ChunkGridError::InvalidBoundaries(_))
        ));
        // Zero width chunk
        assert!(ChunkGrid::from_block_starts(&[vec![0, 2, 2]], &[4]).is_err());
        // Start beyond the extent
        assert!(ChunkGrid::from_block_starts(&[vec![0, 5]], &[4]).is_err());
        // The unchecked variant keeps whatever was reported
        let chunk_grid = ChunkGrid::from_block_starts_unchecked(&[vec![0, 2, 2]], &[4]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 2, 4]]);
    }

    #[test]
    fn chunk_grid_from_chunk_sizes() {
        let chunk_grid = ChunkGrid::from_chunk_sizes(&[vec![2, 2], vec![1, 5]], &[4, 6]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4], vec![0, 1, 6]]);
        assert_eq!(chunk_grid.chunk_sizes(), vec![vec![2, 2], vec![1, 5]]);
        assert!(ChunkGrid::from_chunk_sizes(&[vec![2, 0, 2]], &[4]).is_err());
        assert!(ChunkGrid::from_chunk_sizes(&[vec![2, 1]], &[4]).is_err());
        assert!(ChunkGrid::from_chunk_sizes(&[vec![4]], &[4, 4]).is_err());
    }

    #[test]
    fn chunk_grid_from_chunk_sizes_overflow() {
        // u64::MAX + 6 wraps to the extent
        assert!(matches!(
            ChunkGrid::from_chunk_sizes(&[vec![u64::MAX, 6]], &[5]),
            Err(ChunkGridError::InvalidChunkSizes {
                axis: 0,
                sum: u64::MAX,
                extent: 5,
                ..
            })
        ));
        assert!(ChunkGrid::from_chunk_sizes(&[vec![2, 2], vec![u64::MAX, 1]], &[4, 0]).is_err());
    }

    #[test]
    fn chunk_grid_new() {
        assert!(ChunkGrid::new(vec![vec![0, 2, 4]]).is_ok());
        assert!(ChunkGrid::new(vec![vec![0]]).is_ok());
        assert_eq!(ChunkGrid::new(vec![vec![0, 3, 3]]).unwrap_err().axis(), 0);
        assert_eq!(ChunkGrid::new(vec![vec![0, 1], vec![]]).unwrap_err().axis(), 1);
    }

    #[test]
    fn chunk_grid_subset_and_chunk_indices() {
        let chunk_grid = ChunkGrid::new(vec![vec![0, 5, 10, 15, 30, 45, 65, 100], vec![0, 10, 20]])
            .unwrap();
        assert_eq!(chunk_grid.grid_shape(), vec![7, 2]);
        assert_eq!(chunk_grid.chunk_indices(&[17, 17]).unwrap(), vec![3, 1]);
        assert_eq!(chunk_grid.chunk_indices(&[0, 0]).unwrap(), vec![0, 0]);
        assert_eq!(chunk_grid.chunk_indices(&[99, 10]).unwrap(), vec![6, 1]);
        assert!(chunk_grid.chunk_indices(&[100, 0]).is_err());
        assert!(chunk_grid.chunk_indices(&[0]).is_err());

        assert_eq!(
            chunk_grid.subset(&[3, 1]).unwrap(),
            ArraySubset::new_with_ranges(&[15..30, 10..20])
        );
        assert!(chunk_grid.subset(&[7, 0]).is_err());
        assert!(chunk_grid.subset(&[0, 0, 0]).is_err());
    }

    #[test]
    fn chunk_grid_normalize_chunks() {
        let chunk_grid = normalize_chunks(None, &[4, 0]).unwrap();
        assert_eq!(chunk_grid.boundaries(), &[vec![0, 4], vec![0]]);

        let chunk_spec = ChunkSpec::try_from(2u64).unwrap();
        assert_eq!(
            normalize_chunks(Some(&chunk_spec), &[4, 6]).unwrap(),
            normalize_chunks(Some(&chunk_spec), &[4, 6]).unwrap()
        );
    }
}
