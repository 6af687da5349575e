//! The chunk manager.
//!
//! A [`ChunkManager`] presents an eager [`ArrayBackend`] through the interface of a lazily-chunked array library.
//! Chunks are never computed lazily: they only describe the partition used to move data block-at-a-time.
//!
//! - [`chunks`](ChunkManager::chunks) derives a [`ChunkGrid`] from the block starts reported by a backend array.
//! - [`normalize_chunks`](ChunkManager::normalize_chunks) derives a [`ChunkGrid`] from a [`ChunkSpec`] and a shape.
//! - [`from_array`](ChunkManager::from_array) and [`store`](ChunkManager::store) copy arrays one block at a time, in row-major block order.
//! - [`compute`](ChunkManager::compute) is a pass-through, and [`unify_chunks`](ChunkManager::unify_chunks) never rechunks.
//! - The lazy graph operations ([`UnsupportedOperation`]) always fail with [`ChunkManagerError::Unsupported`].
//!
//! A grid is derived fresh on every call and block transfers are not transactional.
//! If a backend read or write fails part way through, the blocks before it remain copied.

mod chunk_manager_errors;
mod operation;

pub use chunk_manager_errors::ChunkManagerError;
pub use operation::{ChunkManagerOperation, SupportedOperation, UnsupportedOperation};

use std::collections::BTreeMap;

use crate::{
    array::{
        chunk_grid::{self, ChunkSpec},
        ArrayBackend, ArrayError, ArrayLike, ChunkGrid,
    },
    array_subset::IncompatibleDimensionalityError,
    config::global_config,
};

/// An argument of [`ChunkManager::unify_chunks`].
///
/// Arguments alternate between an array and its index string, one character per axis (e.g. `"ij"`).
#[derive(Copy, Clone, Debug)]
pub enum UnifyChunksArgument<'a> {
    /// An array.
    Array(&'a dyn ArrayLike),
    /// The index string of the preceding array.
    Indices(&'a str),
}

/// A chunk manager for an eager array backend.
#[derive(Debug, Clone, Default)]
pub struct ChunkManager<B: ArrayBackend> {
    backend: B,
}

/// Copy every block of `chunk_grid` from `source` to the same region of `target`.
fn copy_blocks<S: ArrayLike + ?Sized, T: ArrayLike + ?Sized>(
    chunk_grid: &ChunkGrid,
    source: &S,
    target: &T,
) -> Result<(), ArrayError> {
    for block in &chunk_grid.blocks() {
        log::trace!("copying block {block}");
        let bytes = source.retrieve_array_subset(&block)?;
        target.store_array_subset(&block, &bytes)?;
    }
    Ok(())
}

impl<B: ArrayBackend> ChunkManager<B> {
    /// Create a new chunk manager for `backend`.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The array API namespace of the backend.
    #[must_use]
    pub const fn array_api(&self) -> &B {
        &self.backend
    }

    /// Returns true if `data` is a chunked array of this manager's backend.
    ///
    /// Arrays are recognised by their [`ArrayKind`](crate::array::ArrayKind) tag.
    #[must_use]
    pub fn is_chunked_array(&self, data: &dyn ArrayLike) -> bool {
        data.kind() == self.backend.array_kind()
    }

    /// Returns true if the manager supports `operation`.
    #[must_use]
    pub const fn supports(&self, operation: ChunkManagerOperation) -> bool {
        operation.is_supported()
    }

    /// Build the chunk grid of `data` from its block starts, or [`None`] if it is not a chunked array.
    fn block_starts_chunk_grid(
        &self,
        data: &dyn ArrayLike,
    ) -> Option<Result<ChunkGrid, ChunkManagerError>> {
        if !self.is_chunked_array(data) {
            return None;
        }
        let block_starts = data.block_starts()?;
        let validate_block_starts = global_config().validate_block_starts();
        Some(if validate_block_starts {
            ChunkGrid::from_block_starts(&block_starts, data.shape()).map_err(Into::into)
        } else {
            log::warn!("using unvalidated block starts {block_starts:?}");
            ChunkGrid::from_block_starts_unchecked(&block_starts, data.shape())
                .map_err(|err| chunk_grid::ChunkGridError::from(err).into())
        })
    }

    /// Return the chunk grid of `data`, derived from the block starts it reports.
    ///
    /// # Errors
    /// Returns [`ChunkManagerError::NotAChunkedArray`] if `data` is not a chunked array of this manager's backend,
    /// or [`ChunkManagerError::InvalidChunks`] if the reported block starts are invalid.
    pub fn chunks(&self, data: &dyn ArrayLike) -> Result<ChunkGrid, ChunkManagerError> {
        self.block_starts_chunk_grid(data)
            .unwrap_or_else(|| Err(ChunkManagerError::NotAChunkedArray(data.kind())))
    }

    /// Normalise `chunks` against an array with `shape`.
    ///
    /// Without a specification, every axis is a single chunk.
    ///
    /// # Errors
    /// Returns [`ChunkManagerError::InvalidChunks`] if a per-axis specification does not have one entry per axis (or a single entry),
    /// or explicit chunk widths do not sum to an axis extent.
    pub fn normalize_chunks(
        &self,
        chunks: Option<&ChunkSpec>,
        shape: &[u64],
    ) -> Result<ChunkGrid, ChunkManagerError> {
        Ok(chunk_grid::normalize_chunks(chunks, shape)?)
    }

    /// Copy `data` into a new zero-initialised backend array of the same shape and data type.
    ///
    /// `chunks` only sets the granularity of the block-wise copy, it does not affect the result.
    ///
    /// # Errors
    /// Returns [`ChunkManagerError::InvalidChunks`] if `chunks` is incompatible with the shape of `data`.
    /// Backend failures are returned as [`ChunkManagerError::Array`].
    pub fn from_array(
        &self,
        data: &dyn ArrayLike,
        chunks: &ChunkSpec,
    ) -> Result<B::Array, ChunkManagerError> {
        let chunk_grid = ChunkGrid::from_chunk_spec(chunks, data.shape())?;
        log::debug!(
            "from_array: shape {:?}, chunks {chunks}, grid shape {:?}, {} blocks",
            data.shape(),
            chunk_grid.grid_shape(),
            chunk_grid.num_blocks()
        );
        let array = self
            .backend
            .zeros(data.shape().to_vec(), *data.data_type())?;
        copy_blocks(&chunk_grid, data, &array)?;
        Ok(array)
    }

    /// Compute `data`.
    ///
    /// The backend is eager, so `data` is returned unchanged.
    #[must_use]
    pub fn compute<T>(&self, data: T) -> T {
        data
    }

    /// Unify the chunks of `args`.
    ///
    /// Returns the chunk widths for each index character, taken from the first array axis labelled with it,
    /// and the arrays in argument order.
    /// Arrays are never rechunked.
    /// An array that is not chunked contributes a single chunk per axis.
    /// An index string that does not follow an array is ignored.
    ///
    /// # Errors
    /// Returns [`ChunkManagerError::InvalidIndices`] if an index string does not have one character per axis of its array,
    /// or [`ChunkManagerError::InvalidChunks`] if the block starts of an array are invalid.
    pub fn unify_chunks<'a>(
        &self,
        args: &[UnifyChunksArgument<'a>],
    ) -> Result<(BTreeMap<char, Vec<u64>>, Vec<&'a dyn ArrayLike>), ChunkManagerError> {
        let mut chunkss = BTreeMap::new();
        let mut arrays = Vec::new();
        let mut preceding_array = None;
        for arg in args {
            match *arg {
                UnifyChunksArgument::Array(array) => {
                    arrays.push(array);
                    preceding_array = Some(array);
                }
                UnifyChunksArgument::Indices(indices) => {
                    let Some(array) = preceding_array.take() else {
                        log::debug!("unify_chunks: ignoring unpaired index string {indices:?}");
                        continue;
                    };
                    if indices.chars().count() != array.dimensionality() {
                        return Err(ChunkManagerError::InvalidIndices {
                            indices: indices.to_string(),
                            dimensionality: array.dimensionality(),
                        });
                    }
                    let chunk_grid = match self.block_starts_chunk_grid(array) {
                        Some(chunk_grid) => chunk_grid?,
                        None => chunk_grid::normalize_chunks(None, array.shape())?,
                    };
                    for (index, chunk_sizes) in
                        std::iter::zip(indices.chars(), chunk_grid.chunk_sizes())
                    {
                        chunkss.entry(index).or_insert(chunk_sizes);
                    }
                }
            }
        }
        Ok((chunkss, arrays))
    }

    /// Check a source/target pair of [`store`](ChunkManager::store) and return the chunk grid of the source.
    fn store_chunk_grid(
        &self,
        index: usize,
        source: &dyn ArrayLike,
        target: &dyn ArrayLike,
    ) -> Result<ChunkGrid, ChunkManagerError> {
        let chunk_grid = self.block_starts_chunk_grid(source).unwrap_or_else(|| {
            Err(ChunkManagerError::UnrecognizedSource {
                index,
                kind: source.kind(),
            })
        })?;
        if target.dimensionality() != source.dimensionality() {
            return Err(ChunkManagerError::IncompatibleTargetDimensionality(
                index,
                IncompatibleDimensionalityError::new(
                    target.dimensionality(),
                    source.dimensionality(),
                ),
            ));
        }
        if target.data_type() != source.data_type() {
            return Err(ChunkManagerError::IncompatibleDataType(
                index,
                *source.data_type(),
                *target.data_type(),
            ));
        }
        Ok(chunk_grid)
    }

    /// Store each of `sources` into the corresponding target, one block at a time.
    ///
    /// The blocks of a source are taken from its block starts and copied to the same region of its target in row-major block order.
    /// Returns the targets if `return_stored` is true.
    ///
    /// If the [store validate all sources](crate::config::Config#store-validate-all-sources) option is enabled,
    /// all pairs are checked before any block is copied.
    ///
    /// # Errors
    /// Returns an invalid-argument [`ChunkManagerError`] if
    ///  - the number of sources and targets differ,
    ///  - a source is not a chunked array of this manager's backend or has invalid block starts, or
    ///  - a target has a different dimensionality or data type to its source.
    ///
    /// Backend failures are returned as [`ChunkManagerError::Array`].
    pub fn store<'a>(
        &self,
        sources: &[&dyn ArrayLike],
        targets: &[&'a dyn ArrayLike],
        return_stored: bool,
    ) -> Result<Option<Vec<&'a dyn ArrayLike>>, ChunkManagerError> {
        if sources.len() != targets.len() {
            return Err(ChunkManagerError::SourceTargetCountMismatch {
                sources: sources.len(),
                targets: targets.len(),
            });
        }
        log::debug!("store: {} source/target pairs", sources.len());

        let store_pair = |index: usize, chunk_grid: &ChunkGrid| -> Result<(), ChunkManagerError> {
            log::debug!(
                "store: pair {index}, shape {:?}, grid shape {:?}, {} blocks",
                sources[index].shape(),
                chunk_grid.grid_shape(),
                chunk_grid.num_blocks()
            );
            copy_blocks(chunk_grid, sources[index], targets[index])?;
            Ok(())
        };

        let store_validate_all_sources = global_config().store_validate_all_sources();
        if store_validate_all_sources {
            let chunk_grids = std::iter::zip(sources, targets)
                .enumerate()
                .map(|(index, (source, target))| self.store_chunk_grid(index, *source, *target))
                .collect::<Result<Vec<_>, _>>()?;
            for (index, chunk_grid) in chunk_grids.iter().enumerate() {
                store_pair(index, chunk_grid)?;
            }
        } else {
            for (index, (source, target)) in std::iter::zip(sources, targets).enumerate() {
                let chunk_grid = self.store_chunk_grid(index, *source, *target)?;
                store_pair(index, &chunk_grid)?;
            }
        }

        Ok(return_stored.then(|| targets.to_vec()))
    }

    /// A tree reduction. Not implemented for an eager backend.
    ///
    /// # Errors
    /// Always returns [`ChunkManagerError::Unsupported`].
    pub fn reduction<F>(
        &self,
        _data: &dyn ArrayLike,
        _func: F,
        _axes: Option<&[usize]>,
    ) -> Result<B::Array, ChunkManagerError> {
        Err(ChunkManagerError::Unsupported(UnsupportedOperation::Reduction))
    }

    /// A cumulative scan. Not implemented for an eager backend.
    ///
    /// # Errors
    /// Always returns [`ChunkManagerError::Unsupported`].
    pub fn scan<F>(
        &self,
        _func: F,
        _data: &dyn ArrayLike,
        _axis: Option<usize>,
    ) -> Result<B::Array, ChunkManagerError> {
        Err(ChunkManagerError::Unsupported(UnsupportedOperation::Scan))
    }

    /// Generalised ufunc application. Not implemented for an eager backend.
    ///
    /// # Errors
    /// Always returns [`ChunkManagerError::Unsupported`].
    pub fn apply_gufunc<F>(
        &self,
        _func: F,
        _signature: &str,
        _args: &[&dyn ArrayLike],
    ) -> Result<Vec<B::Array>, ChunkManagerError> {
        Err(ChunkManagerError::Unsupported(
            UnsupportedOperation::ApplyGufunc,
        ))
    }

    /// Per-block function mapping. Not implemented for an eager backend.
    ///
    /// # Errors
    /// Always returns [`ChunkManagerError::Unsupported`].
    pub fn map_blocks<F>(
        &self,
        _func: F,
        _args: &[&dyn ArrayLike],
        _chunks: Option<&ChunkSpec>,
    ) -> Result<B::Array, ChunkManagerError> {
        Err(ChunkManagerError::Unsupported(UnsupportedOperation::MapBlocks))
    }

    /// Blockwise fusion. Not implemented for an eager backend.
    ///
    /// # Errors
    /// Always returns [`ChunkManagerError::Unsupported`].
    pub fn blockwise<F>(
        &self,
        _func: F,
        _out_indices: &str,
        _args: &[UnifyChunksArgument<'_>],
    ) -> Result<B::Array, ChunkManagerError> {
        Err(ChunkManagerError::Unsupported(UnsupportedOperation::Blockwise))
    }
}
