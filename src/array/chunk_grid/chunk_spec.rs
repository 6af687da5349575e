//! Chunk size specifications.
//!
//! A [`ChunkSpec`] is what a caller asks for, a [`ChunkGrid`](super::ChunkGrid) is what it gets after normalisation against an array shape.
//!
//! The serialised forms follow the usual chunk arguments of lazy array libraries:
//! ```json
//! 2                  // uniform width 2 on every axis
//! [2, 3]             // width 2 on axis 0, width 3 on axis 1
//! [4]                // width 4, broadcast to every axis
//! [[1, 3], 2]        // explicit widths 1 and 3 on axis 0, width 2 on axis 1
//! [null, 2]          // a single chunk on axis 0, width 2 on axis 1
//! ```

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A chunk size specification.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Debug)]
#[serde(untagged)]
pub enum ChunkSpec {
    /// A single chunk width applied uniformly to every axis.
    Uniform(NonZeroU64),
    /// One entry per axis, or a single entry broadcast to every axis.
    PerAxis(Vec<ChunkDimensionSpec>),
}

/// The chunk specification of a single axis.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Debug)]
#[serde(untagged)]
pub enum ChunkDimensionSpec {
    /// A fixed chunk width. The final chunk is narrower if the width does not divide the axis extent.
    Fixed(NonZeroU64),
    /// Explicit chunk widths. They must sum to the axis extent.
    Varying(Vec<NonZeroU64>),
    /// A single chunk spanning the whole axis.
    Full,
}

/// A zero chunk width error.
#[derive(Copy, Clone, Debug, Error)]
#[error("chunk widths must be non-zero")]
pub struct NonZeroError;

impl core::fmt::Display for ChunkSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", serde_json::to_string(self).unwrap_or_default())
    }
}

impl From<NonZeroU64> for ChunkSpec {
    fn from(width: NonZeroU64) -> Self {
        Self::Uniform(width)
    }
}

impl From<Vec<ChunkDimensionSpec>> for ChunkSpec {
    fn from(dimensions: Vec<ChunkDimensionSpec>) -> Self {
        Self::PerAxis(dimensions)
    }
}

impl TryFrom<u64> for ChunkSpec {
    type Error = NonZeroError;

    fn try_from(width: u64) -> Result<Self, Self::Error> {
        Ok(Self::Uniform(NonZeroU64::new(width).ok_or(NonZeroError)?))
    }
}

macro_rules! try_from_chunk_spec {
    ( $t:ty ) => {
        impl TryFrom<$t> for ChunkSpec {
            type Error = NonZeroError;
            fn try_from(widths: $t) -> Result<Self, Self::Error> {
                Ok(Self::PerAxis(
                    widths
                        .iter()
                        .map(|&width| ChunkDimensionSpec::try_from(width))
                        .collect::<Result<_, _>>()?,
                ))
            }
        }
    };
    ( $t:ty, $g:ident ) => {
        impl<const $g: usize> TryFrom<$t> for ChunkSpec {
            type Error = NonZeroError;
            fn try_from(widths: $t) -> Result<Self, Self::Error> {
                Ok(Self::PerAxis(
                    widths
                        .iter()
                        .map(|&width| ChunkDimensionSpec::try_from(width))
                        .collect::<Result<_, _>>()?,
                ))
            }
        }
    };
}

try_from_chunk_spec!(Vec<u64>);
try_from_chunk_spec!(&[u64]);
try_from_chunk_spec!([u64; N], N);
try_from_chunk_spec!(&[u64; N], N);

impl From<NonZeroU64> for ChunkDimensionSpec {
    fn from(width: NonZeroU64) -> Self {
        Self::Fixed(width)
    }
}

impl From<Vec<NonZeroU64>> for ChunkDimensionSpec {
    fn from(widths: Vec<NonZeroU64>) -> Self {
        Self::Varying(widths)
    }
}

impl TryFrom<u64> for ChunkDimensionSpec {
    type Error = NonZeroError;

    fn try_from(width: u64) -> Result<Self, Self::Error> {
        Ok(Self::Fixed(NonZeroU64::new(width).ok_or(NonZeroError)?))
    }
}

impl TryFrom<&[u64]> for ChunkDimensionSpec {
    type Error = NonZeroError;

    fn try_from(widths: &[u64]) -> Result<Self, Self::Error> {
        Ok(Self::Varying(
            widths
                .iter()
                .map(|&width| NonZeroU64::new(width).ok_or(NonZeroError))
                .collect::<Result<_, _>>()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(width: u64) -> NonZeroU64 {
        NonZeroU64::new(width).unwrap()
    }

    #[test]
    fn chunk_spec_deserialize() {
        assert_eq!(
            serde_json::from_str::<ChunkSpec>("2").unwrap(),
            ChunkSpec::Uniform(nz(2))
        );
        assert_eq!(
            serde_json::from_str::<ChunkSpec>("[2, 3]").unwrap(),
            ChunkSpec::try_from([2u64, 3]).unwrap()
        );
        assert_eq!(
            serde_json::from_str::<ChunkSpec>("[[1, 3], 2]").unwrap(),
            ChunkSpec::PerAxis(vec![
                ChunkDimensionSpec::Varying(vec![nz(1), nz(3)]),
                ChunkDimensionSpec::Fixed(nz(2)),
            ])
        );
        assert_eq!(
            serde_json::from_str::<ChunkSpec>("[null, 2]").unwrap(),
            ChunkSpec::PerAxis(vec![ChunkDimensionSpec::Full, ChunkDimensionSpec::Fixed(nz(2))])
        );
        assert!(serde_json::from_str::<ChunkSpec>("0").is_err());
        assert!(serde_json::from_str::<ChunkSpec>("[2, 0]").is_err());
    }

    #[test]
    fn chunk_spec_display() {
        let chunk_spec = ChunkSpec::PerAxis(vec![
            ChunkDimensionSpec::Varying(vec![nz(1), nz(3)]),
            ChunkDimensionSpec::Full,
        ]);
        assert_eq!(chunk_spec.to_string(), "[[1,3],null]");
        assert_eq!(ChunkSpec::from(nz(4)).to_string(), "4");
    }

    #[test]
    fn chunk_spec_try_from() {
        assert!(ChunkSpec::try_from(0u64).is_err());
        assert!(ChunkSpec::try_from(vec![1u64, 0]).is_err());
        assert_eq!(ChunkSpec::try_from(5u64).unwrap(), ChunkSpec::Uniform(nz(5)));
        assert_eq!(
            ChunkDimensionSpec::try_from([2u64, 2].as_slice()).unwrap(),
            ChunkDimensionSpec::Varying(vec![nz(2), nz(2)])
        );
    }
}
