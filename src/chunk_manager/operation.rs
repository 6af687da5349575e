use derive_more::{Display, From};

/// A chunk manager operation.
///
/// The operation set is closed: every operation is either supported by an eager backend or refused outright.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, From)]
pub enum ChunkManagerOperation {
    /// A supported operation.
    Supported(SupportedOperation),
    /// An operation which always fails with [`ChunkManagerError::Unsupported`](super::ChunkManagerError::Unsupported).
    Unsupported(UnsupportedOperation),
}

/// An operation supported by the [`ChunkManager`](super::ChunkManager).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum SupportedOperation {
    /// Chunk introspection.
    #[display("chunks")]
    Chunks,
    /// Chunk normalisation.
    #[display("normalize_chunks")]
    NormalizeChunks,
    /// Conversion of an array into a backend array.
    #[display("from_array")]
    FromArray,
    /// The array API namespace.
    #[display("array_api")]
    ArrayApi,
    /// Computation (a pass-through for an eager backend).
    #[display("compute")]
    Compute,
    /// Chunk unification.
    #[display("unify_chunks")]
    UnifyChunks,
    /// Block-wise copy of sources into targets.
    #[display("store")]
    Store,
}

/// A lazy graph operation that an eager backend does not implement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum UnsupportedOperation {
    /// A tree reduction.
    #[display("reduction")]
    Reduction,
    /// A cumulative scan.
    #[display("scan")]
    Scan,
    /// Generalised ufunc application.
    #[display("apply_gufunc")]
    ApplyGufunc,
    /// Per-block function mapping.
    #[display("map_blocks")]
    MapBlocks,
    /// Blockwise fusion.
    #[display("blockwise")]
    Blockwise,
}

impl ChunkManagerOperation {
    /// Every chunk manager operation.
    pub const ALL: [Self; 12] = [
        Self::Supported(SupportedOperation::Chunks),
        Self::Supported(SupportedOperation::NormalizeChunks),
        Self::Supported(SupportedOperation::FromArray),
        Self::Supported(SupportedOperation::ArrayApi),
        Self::Supported(SupportedOperation::Compute),
        Self::Supported(SupportedOperation::UnifyChunks),
        Self::Supported(SupportedOperation::Store),
        Self::Unsupported(UnsupportedOperation::Reduction),
        Self::Unsupported(UnsupportedOperation::Scan),
        Self::Unsupported(UnsupportedOperation::ApplyGufunc),
        Self::Unsupported(UnsupportedOperation::MapBlocks),
        Self::Unsupported(UnsupportedOperation::Blockwise),
    ];

    /// Returns true if the operation is supported.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}
