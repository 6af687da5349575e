use std::{iter::FusedIterator, ops::Range};

use crate::{
    array::{unravel_index, ArrayShape},
    array_subset::ArraySubset,
};

use super::ChunkGrid;

/// The blocks of a [`ChunkGrid`].
///
/// The blocks are the Cartesian product of the per-axis chunk ranges.
/// They are addressed by a linearised block index and iterated in row-major order, so axis 0 varies slowest and the last axis fastest.
///
/// For example, a 4x6 array with a uniform chunk width of 2 has the blocks
/// ```text
/// (0:2, 0:2)  (0:2, 2:4)  (0:2, 4:6)
/// (2:4, 0:2)  (2:4, 2:4)  (2:4, 4:6)
/// ```
/// which are produced in the order `(0:2, 0:2), (0:2, 2:4), (0:2, 4:6), (2:4, 0:2), (2:4, 2:4), (2:4, 4:6)`.
///
/// The per-axis ranges are stored in a single range table indexed by axis offsets.
/// A block is resolved on demand from its index, so no partial coordinates are ever accumulated.
#[derive(Clone, Debug)]
pub struct Blocks {
    /// The chunk ranges of every axis, concatenated.
    ranges: Vec<Range<u64>>,
    /// The offset of the first range of each axis in `ranges`, with a trailing total.
    axis_offsets: Vec<usize>,
    /// The number of chunks per axis.
    grid_shape: ArrayShape,
    length: usize,
}

impl Blocks {
    /// Create the blocks of `chunk_grid`.
    ///
    /// # Panics
    /// Panics if the number of blocks exceeds [`usize::MAX`].
    #[must_use]
    pub fn new(chunk_grid: &ChunkGrid) -> Self {
        let mut ranges = Vec::new();
        let mut axis_offsets = Vec::with_capacity(chunk_grid.dimensionality() + 1);
        for axis_boundaries in chunk_grid.boundaries() {
            axis_offsets.push(ranges.len());
            ranges.extend(
                axis_boundaries
                    .windows(2)
                    .map(|pair| pair[0]..pair[1]),
            );
        }
        axis_offsets.push(ranges.len());
        let grid_shape = chunk_grid.grid_shape();
        let length = usize::try_from(grid_shape.iter().product::<u64>()).unwrap();
        Self {
            ranges,
            axis_offsets,
            grid_shape,
            length,
        }
    }

    /// Return the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if there are no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of chunks per axis.
    #[must_use]
    pub fn grid_shape(&self) -> &[u64] {
        &self.grid_shape
    }

    /// The chunk ranges of `axis`.
    ///
    /// # Panics
    /// Panics if `axis` is not less than the dimensionality of the grid.
    #[must_use]
    pub fn axis_ranges(&self, axis: usize) -> &[Range<u64>] {
        &self.ranges[self.axis_offsets[axis]..self.axis_offsets[axis + 1]]
    }

    /// Return the block at linearised block index `index`, or [`None`] if it is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ArraySubset> {
        (index < self.length).then(|| self.block_unchecked(index as u64))
    }

    fn block_unchecked(&self, index: u64) -> ArraySubset {
        let chunk_indices = unravel_index(index, &self.grid_shape);
        let (start, shape) = std::iter::zip(&chunk_indices, &self.axis_offsets)
            .map(|(&chunk_index, &axis_offset)| {
                let range = &self.ranges[axis_offset + usize::try_from(chunk_index).unwrap()];
                (range.start, range.end.saturating_sub(range.start))
            })
            .unzip();
        unsafe { ArraySubset::new_with_start_shape_unchecked(start, shape) }
    }

    /// Create a new serial iterator.
    #[must_use]
    pub fn iter(&self) -> BlocksIterator<'_> {
        <&Self as IntoIterator>::into_iter(self)
    }
}

impl<'a> IntoIterator for &'a Blocks {
    type Item = ArraySubset;
    type IntoIter = BlocksIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        BlocksIterator {
            blocks: self,
            index_front: 0,
            index_back: self.length as u64,
        }
    }
}

/// Serial blocks iterator.
///
/// See [`Blocks`].
pub struct BlocksIterator<'a> {
    blocks: &'a Blocks,
    index_front: u64,
    index_back: u64,
}

impl Iterator for BlocksIterator<'_> {
    type Item = ArraySubset;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index_front < self.index_back {
            let block = self.blocks.block_unchecked(self.index_front);
            self.index_front += 1;
            Some(block)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let length = usize::try_from(self.index_back - self.index_front).unwrap();
        (length, Some(length))
    }
}

impl DoubleEndedIterator for BlocksIterator<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index_back > self.index_front {
            self.index_back -= 1;
            Some(self.blocks.block_unchecked(self.index_back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for BlocksIterator<'_> {}

impl FusedIterator for BlocksIterator<'_> {}

/// Enumerate every block of `chunk_grid` in row-major order.
///
/// The result has one [`ArraySubset`] per block, `∏ (len(boundaries_i) - 1)` in total.
#[must_use]
pub fn enumerate_blocks(chunk_grid: &ChunkGrid) -> Vec<ArraySubset> {
    chunk_grid.blocks().iter().collect()
}
