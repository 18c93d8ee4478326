//! Element traits mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to the runtime dtype tag.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
/// - `PartialOrd` - Comparison for max/min reductions
pub trait Element: Copy + Send + Sync + Pod + Zeroable + PartialOrd + Debug + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;
}

/// Integer element used for vertex ids, edge ids, offsets and argmax slots
pub trait IndexElement: Element {
    /// Marker stored in argmax/argmin slots that no row won
    const NONE: Self;

    /// Convert to a position, `None` for negative values
    fn to_index(self) -> Option<usize>;

    /// Convert from a position
    ///
    /// Callers guarantee the position fits the index width.
    fn from_index(i: usize) -> Self;
}

/// Floating point feature element
///
/// Kernels accumulate in f64 and convert back on store.
pub trait FloatElement: Element {
    /// Convert to f64 for accumulation
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
}

impl IndexElement for i32 {
    const NONE: Self = -1;

    #[inline]
    fn to_index(self) -> Option<usize> {
        usize::try_from(self).ok()
    }

    #[inline]
    fn from_index(i: usize) -> Self {
        i as i32
    }
}

impl IndexElement for i64 {
    const NONE: Self = -1;

    #[inline]
    fn to_index(self) -> Option<usize> {
        usize::try_from(self).ok()
    }

    #[inline]
    fn from_index(i: usize) -> Self {
        i as i64
    }
}

impl FloatElement for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl FloatElement for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;
}

#[cfg(feature = "f16")]
impl FloatElement for half::f16 {
    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

#[cfg(feature = "f16")]
impl FloatElement for half::bf16 {
    #[inline]
    fn to_f64(self) -> f64 {
        half::bf16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_and_none() {
        assert_eq!(i32::from_index(7).to_index(), Some(7));
        assert_eq!(i64::NONE.to_index(), None);
        assert_eq!((-3i32).to_index(), None);
    }

    #[cfg(feature = "f16")]
    #[test]
    fn test_half_conversions() {
        let h = half::f16::from_f64(1.5);
        assert_eq!(h.to_f64(), 1.5);
        assert_eq!(<half::bf16 as FloatElement>::from_f64(f64::NEG_INFINITY).to_f64(), f64::NEG_INFINITY);
    }
}
