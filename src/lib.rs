//! A chunk-grid adapter for eagerly evaluated distributed array backends.
//!
//! Lazily-chunked array libraries describe an array as a grid of chunks and expect a backend to build, compute, and store those chunks.
//! An eager backend computes everything immediately, so `chunkbridge` maps that interface onto it:
//! chunk grids are derived from the block layout a backend reports (or from a user supplied [`ChunkSpec`](array::chunk_grid::ChunkSpec)),
//! and data is moved between arrays one block at a time.
//!
//! ## Getting Started
//! - [`chunk_manager::ChunkManager`] is the entry point. It wraps an [`array::ArrayBackend`].
//! - [`array::ArrayLike`] is the contract a backend array implements: shape, data type, block starts, and ranged reads and writes.
//! - [`array::MemoryBackend`] is a complete in-memory backend which simulates a block layout over a number of locales.
//! - [`array::ChunkGrid`] and [`array::chunk_grid::enumerate_blocks`] are the chunk-indexing engine.
//!
//! ## Example
//! ```rust
//! # use std::num::NonZeroUsize;
//! use chunkbridge::array::{chunk_grid::ChunkSpec, ArrayBackend, ArrayLikeExt, DataType, MemoryArray, MemoryBackend};
//! use chunkbridge::chunk_manager::ChunkManager;
//!
//! let chunk_manager = ChunkManager::new(MemoryBackend::new(NonZeroUsize::new(4).unwrap()));
//!
//! // Copy a host array into the backend, two rows and columns at a time
//! let elements: Vec<f32> = (0..24).map(|i| i as f32).collect();
//! let data = MemoryArray::new_host_with_elements(vec![4, 6], &elements)?;
//! let array = chunk_manager.from_array(&data, &ChunkSpec::try_from(2u64)?)?;
//!
//! // The backend array reports its own block layout
//! let chunks = chunk_manager.chunks(&array)?;
//! assert_eq!(chunks.chunk_sizes(), vec![vec![2, 2], vec![3, 3]]);
//!
//! // Store it into another backend array block by block
//! let target = chunk_manager.array_api().zeros(vec![4, 6], DataType::Float32)?;
//! chunk_manager.store(&[&array], &[&target], false)?;
//! assert_eq!(target.retrieve_array_elements::<f32>()?, elements);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//! - `ndarray`: [`ndarray`] utility functions for [`ArrayLike`](array::ArrayLike) and [`MemoryBackend`](array::MemoryBackend).
//!
//! ## Logging
//! `chunkbridge` logs through the [`log`](https://docs.rs/log) facade.
//! Block transfers log a `debug` record per call and a `trace` record per block.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![warn(missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod array_subset;
pub mod chunk_manager;
pub mod config;
