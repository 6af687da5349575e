//! Array data types.
//!
//! A [`DataType`] is the element type reported by an [`ArrayLike`](super::ArrayLike) and passed to [`ArrayBackend::zeros`](super::ArrayBackend::zeros).
//! All data types have a fixed size and the all-zero bit pattern as their zero value.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A data type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
#[rustfmt::skip]
pub enum DataType {
    /// `bool` Boolean.
    #[display("bool")]
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    #[display("int8")]
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    #[display("int16")]
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    #[display("int32")]
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    #[display("int64")]
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    #[display("uint8")]
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    #[display("uint16")]
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    #[display("uint32")]
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    #[display("uint64")]
    UInt64,
    /// `float16` IEEE 754 half-precision floating point: sign bit, 5 bits exponent, 10 bits mantissa.
    #[display("float16")]
    Float16,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    #[display("float32")]
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    #[display("float64")]
    Float64,
    /// `bfloat16` brain floating point data type: sign bit, 8 bits exponent, 7 bits mantissa.
    #[display("bfloat16")]
    BFloat16,
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// Returns the identifier.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::BFloat16 => "bfloat16",
        }
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Create a data type from its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedDataTypeError`] if the identifier is not a known data type.
    pub fn from_identifier(identifier: &str) -> Result<Self, UnsupportedDataTypeError> {
        match identifier {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float16" => Ok(Self::Float16),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "bfloat16" => Ok(Self::BFloat16),
            _ => Err(identifier.to_string().into()),
        }
    }
}

impl core::str::FromStr for DataType {
    type Err = UnsupportedDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s)
    }
}
