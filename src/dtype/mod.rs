//! Data type system for graphops tensors
//!
//! `DType` is the runtime tag carried by every tensor. Dispatch splits it along
//! two closed axes: `IdType` for sparse-structure and argmax indices, and
//! `FloatType` for feature data.

mod element;

pub use element::{Element, FloatElement, IndexElement};

use crate::error::{Error, Result};
use std::fmt;

/// Data types supported by graphops tensors
///
/// The discriminant values are stable:
/// - Floats: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Signed ints: 10-19 (I64=10, I32=11)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 => 8,
            Self::F32 | Self::I32 => 4,
            Self::F16 | Self::BF16 => 2,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true if this is an integer type
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::I64 | Self::I32)
    }

    /// Short name for display
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::I64 => "i64",
            Self::I32 => "i32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Index-width axis of the dispatch matrix
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdType {
    /// 32-bit vertex/edge identifiers
    I32,
    /// 64-bit vertex/edge identifiers
    I64,
}

impl IdType {
    /// The tensor dtype carrying this index width
    #[inline]
    pub const fn dtype(self) -> DType {
        match self {
            Self::I32 => DType::I32,
            Self::I64 => DType::I64,
        }
    }

    /// Classify a dtype, failing for anything that is not an index type
    pub fn from_dtype(dtype: DType, op: &'static str) -> Result<Self> {
        match dtype {
            DType::I32 => Ok(Self::I32),
            DType::I64 => Ok(Self::I64),
            other => Err(Error::unsupported_dtype(other, op)),
        }
    }
}

/// Feature-width axis of the dispatch matrix
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatType {
    /// Half precision (requires the `f16` feature)
    F16,
    /// Brain float (requires the `f16` feature)
    BF16,
    /// Single precision
    F32,
    /// Double precision
    F64,
}

impl FloatType {
    /// The tensor dtype carrying this float width
    #[inline]
    pub const fn dtype(self) -> DType {
        match self {
            Self::F16 => DType::F16,
            Self::BF16 => DType::BF16,
            Self::F32 => DType::F32,
            Self::F64 => DType::F64,
        }
    }

    /// Classify a dtype, failing for anything that is not a float type
    pub fn from_dtype(dtype: DType, op: &'static str) -> Result<Self> {
        match dtype {
            DType::F16 => Ok(Self::F16),
            DType::BF16 => Ok(Self::BF16),
            DType::F32 => Ok(Self::F32),
            DType::F64 => Ok(Self::F64),
            other => Err(Error::unsupported_dtype(other, op)),
        }
    }
}
