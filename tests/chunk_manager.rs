use std::num::NonZeroUsize;

use parking_lot::Mutex;

use chunkbridge::array::chunk_grid::{enumerate_blocks, ChunkSpec};
use chunkbridge::array::{
    ArrayBackend, ArrayError, ArrayKind, ArrayLike, ArrayLikeExt, BlockStarts, DataType,
    MemoryArray, MemoryBackend,
};
use chunkbridge::array_subset::ArraySubset;
use chunkbridge::chunk_manager::{ChunkManager, ChunkManagerError};
use chunkbridge::config::global_config_mut;

fn chunk_manager(num_locales: usize) -> ChunkManager<MemoryBackend> {
    ChunkManager::new(MemoryBackend::new(NonZeroUsize::new(num_locales).unwrap()))
}

/// A distributed array which records every block access and can be told to fail.
#[derive(Debug)]
struct RecordingArray {
    inner: MemoryArray,
    block_starts: BlockStarts,
    reads: Mutex<Vec<ArraySubset>>,
    writes: Mutex<Vec<ArraySubset>>,
    fail_write_at: Option<usize>,
}

impl RecordingArray {
    fn new(inner: MemoryArray, block_starts: BlockStarts) -> Self {
        Self {
            inner,
            block_starts,
            reads: Mutex::default(),
            writes: Mutex::default(),
            fail_write_at: None,
        }
    }

    fn failing_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }
}

impl ArrayLike for RecordingArray {
    fn kind(&self) -> ArrayKind {
        ArrayKind::Distributed
    }

    fn shape(&self) -> &[u64] {
        self.inner.shape()
    }

    fn data_type(&self) -> &DataType {
        self.inner.data_type()
    }

    fn block_starts(&self) -> Option<BlockStarts> {
        Some(self.block_starts.clone())
    }

    fn retrieve_array_subset(&self, array_subset: &ArraySubset) -> Result<Vec<u8>, ArrayError> {
        self.reads.lock().push(array_subset.clone());
        self.inner.retrieve_array_subset(array_subset)
    }

    fn store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError> {
        let mut writes = self.writes.lock();
        if self.fail_write_at == Some(writes.len()) {
            return Err("backend write failed".into());
        }
        writes.push(array_subset.clone());
        self.inner.store_array_subset(array_subset, subset_bytes)
    }
}

#[rustfmt::skip]
#[test]
#[serial_test::serial]
fn chunk_manager_store() -> Result<(), Box<dyn std::error::Error>> {
    let chunk_manager = chunk_manager(4);
    let backend = chunk_manager.array_api();

    //  0  1  2 |  3  4  5
    //  6  7  8 |  9 10 11
    // ---------|---------
    // 12 13 14 | 15 16 17
    // 18 19 20 | 21 22 23
    let elements: Vec<u32> = (0..24).collect();
    let source = backend.asarray(vec![4, 6], &elements)?;
    assert_eq!(source.block_starts(), Some(vec![vec![0, 2], vec![0, 3]]));
    let target = backend.zeros(vec![4, 6], DataType::UInt32)?;

    assert_eq!(chunk_manager.store(&[&source], &[&target], false)?, None);
    assert_eq!(target.retrieve_array_elements::<u32>()?, elements);
    assert_eq!(
        target.retrieve_array_subset_elements::<u32>(&ArraySubset::new_with_ranges(&[2..4, 3..6]))?,
        vec![15, 16, 17, 21, 22, 23]
    );

    let stored = chunk_manager.store(&[&source], &[&target], true)?.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(std::ptr::addr_eq(stored[0], &target as &dyn ArrayLike));
    Ok(())
}

#[test]
#[serial_test::serial]
fn chunk_manager_store_block_order() {
    let chunk_manager = chunk_manager(1);
    let elements: Vec<u8> = (0..24).collect();
    let source = RecordingArray::new(
        MemoryArray::new_host_with_elements(vec![4, 6], &elements).unwrap(),
        vec![vec![0, 2], vec![0, 2, 4]],
    );
    let target = RecordingArray::new(
        MemoryArray::new(ArrayKind::Distributed, vec![4, 6], DataType::UInt8).unwrap(),
        vec![vec![0], vec![0]],
    );
    chunk_manager.store(&[&source], &[&target], false).unwrap();

    let expected = vec![
        ArraySubset::new_with_ranges(&[0..2, 0..2]),
        ArraySubset::new_with_ranges(&[0..2, 2..4]),
        ArraySubset::new_with_ranges(&[0..2, 4..6]),
        ArraySubset::new_with_ranges(&[2..4, 0..2]),
        ArraySubset::new_with_ranges(&[2..4, 2..4]),
        ArraySubset::new_with_ranges(&[2..4, 4..6]),
    ];
    assert_eq!(*source.reads.lock(), expected);
    assert_eq!(*target.writes.lock(), expected);
    assert_eq!(target.retrieve_array_elements::<u8>().unwrap(), elements);
}

#[test]
#[serial_test::serial]
fn chunk_manager_store_count_mismatch() {
    let chunk_manager = chunk_manager(2);
    let backend = chunk_manager.array_api();
    let source = backend.asarray(vec![2, 2], &[1u8, 2, 3, 4]).unwrap();
    let target_a = RecordingArray::new(
        MemoryArray::new(ArrayKind::Distributed, vec![2, 2], DataType::UInt8).unwrap(),
        vec![vec![0], vec![0]],
    );
    let target_b = backend.zeros(vec![2, 2], DataType::UInt8).unwrap();

    let err = chunk_manager
        .store(&[&source], &[&target_a, &target_b], false)
        .unwrap_err();
    assert!(matches!(
        err,
        ChunkManagerError::SourceTargetCountMismatch {
            sources: 1,
            targets: 2
        }
    ));
    assert!(err.is_invalid_argument());
    assert!(target_a.writes.lock().is_empty());
}

#[test]
#[serial_test::serial]
fn chunk_manager_store_unrecognized_source() {
    let chunk_manager = chunk_manager(2);
    let backend = chunk_manager.array_api();
    let source_a = backend.asarray(vec![4], &[1i16, 2, 3, 4]).unwrap();
    let source_b = MemoryArray::new_host_with_elements(vec![4], &[5i16, 6, 7, 8]).unwrap();
    let target_a = backend.zeros(vec![4], DataType::Int16).unwrap();
    let target_b = backend.zeros(vec![4], DataType::Int16).unwrap();

    let err = chunk_manager
        .store(&[&source_a, &source_b], &[&target_a, &target_b], false)
        .unwrap_err();
    assert!(matches!(
        err,
        ChunkManagerError::UnrecognizedSource {
            index: 1,
            kind: ArrayKind::Host
        }
    ));
    // All pairs are validated before any block is copied
    assert_eq!(target_a.retrieve_array_elements::<i16>().unwrap(), vec![0; 4]);

    // Pairs are validated as they are copied
    global_config_mut().set_store_validate_all_sources(false);
    let result = chunk_manager.store(&[&source_a, &source_b], &[&target_a, &target_b], false);
    global_config_mut().set_store_validate_all_sources(true);
    assert!(matches!(
        result,
        Err(ChunkManagerError::UnrecognizedSource { index: 1, .. })
    ));
    assert_eq!(
        target_a.retrieve_array_elements::<i16>().unwrap(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(target_b.retrieve_array_elements::<i16>().unwrap(), vec![0; 4]);
}

#[test]
#[serial_test::serial]
fn chunk_manager_store_incompatible_target() {
    let chunk_manager = chunk_manager(1);
    let backend = chunk_manager.array_api();
    let source = backend.asarray(vec![2, 2], &[1.0f64, 2.0, 3.0, 4.0]).unwrap();

    let target = backend.zeros(vec![4], DataType::Float64).unwrap();
    assert!(matches!(
        chunk_manager.store(&[&source], &[&target], false),
        Err(ChunkManagerError::IncompatibleTargetDimensionality(0, _))
    ));

    let target = backend.zeros(vec![2, 2], DataType::Float32).unwrap();
    assert!(matches!(
        chunk_manager.store(&[&source], &[&target], false),
        Err(ChunkManagerError::IncompatibleDataType(
            0,
            DataType::Float64,
            DataType::Float32
        ))
    ));
}

#[test]
#[serial_test::serial]
fn chunk_manager_store_backend_failure() {
    let chunk_manager = chunk_manager(1);
    let elements: Vec<u8> = (0..16).collect();
    let source = chunk_manager
        .array_api()
        .asarray(vec![4, 4], &elements)
        .unwrap()
        .with_block_starts(vec![vec![0, 2], vec![0, 2]]);
    let target = RecordingArray::new(
        MemoryArray::new(ArrayKind::Distributed, vec![4, 4], DataType::UInt8).unwrap(),
        vec![vec![0], vec![0]],
    )
    .failing_write_at(2);

    let err = chunk_manager
        .store(&[&source], &[&target], false)
        .unwrap_err();
    assert!(matches!(err, ChunkManagerError::Array(ArrayError::Other(_))));
    assert!(!err.is_invalid_argument());

    // Blocks copied before the failure remain copied
    assert_eq!(target.writes.lock().len(), 2);
    assert_eq!(
        target.retrieve_array_elements::<u8>().unwrap(),
        vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn chunk_manager_from_array_block_order() {
    let chunk_manager = chunk_manager(3);
    let elements: Vec<u8> = (0..30).collect();
    let data = RecordingArray::new(
        MemoryArray::new_host_with_elements(vec![5, 6], &elements).unwrap(),
        vec![vec![0], vec![0]],
    );
    let chunk_spec: ChunkSpec = serde_json::from_str("[2, [1, 5]]").unwrap();
    let array = chunk_manager.from_array(&data, &chunk_spec).unwrap();

    assert_eq!(array.shape(), &[5, 6]);
    assert_eq!(array.data_type(), &DataType::UInt8);
    assert_eq!(array.retrieve_array_elements::<u8>().unwrap(), elements);
    let chunk_grid = chunk_manager
        .normalize_chunks(Some(&chunk_spec), &[5, 6])
        .unwrap();
    assert_eq!(chunk_grid.boundaries(), &[vec![0, 2, 4, 5], vec![0, 1, 6]]);
    assert_eq!(*data.reads.lock(), enumerate_blocks(&chunk_grid));
}

#[test]
fn chunk_manager_from_array_zero_extent() {
    let chunk_manager = chunk_manager(2);
    let data = MemoryArray::new(ArrayKind::Host, vec![0, 3], DataType::Bool).unwrap();
    let array = chunk_manager
        .from_array(&data, &ChunkSpec::try_from(2u64).unwrap())
        .unwrap();
    assert_eq!(array.shape(), &[0, 3]);
    assert_eq!(array.num_elements(), 0);
}

#[cfg(feature = "ndarray")]
#[test]
#[serial_test::serial]
fn chunk_manager_store_ndarray() {
    let chunk_manager = chunk_manager(6);
    let backend = chunk_manager.array_api();
    let elements = ndarray::Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 20 + j * 5 + k) as i32);
    let source = backend.from_ndarray(&elements.view().into_dyn()).unwrap();
    assert_eq!(
        chunk_manager.chunks(&source).unwrap().grid_shape(),
        vec![3, 2, 1]
    );
    let target = backend.zeros(vec![3, 4, 5], DataType::Int32).unwrap();
    chunk_manager.store(&[&source], &[&target], false).unwrap();
    assert_eq!(
        target.retrieve_array_ndarray::<i32>().unwrap(),
        elements.into_dyn()
    );
}
