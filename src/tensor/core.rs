//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Context;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};
use std::fmt;

/// N-dimensional array descriptor handed to the engine by the caller
///
/// A `Tensor` consists of:
/// - **Storage**: reference-counted memory
/// - **Layout**: shape, strides, and offset defining the view into storage
/// - **Context**: the device the data belongs to
///
/// The engine only reads descriptors and passes references through to kernels;
/// it never copies or frees caller tensors. The first dimension of every
/// operand is bound to a graph count (vertices or edges); the remaining
/// dimensions form the per-element feature shape.
///
/// # Example
///
/// ```
/// use graphops::prelude::*;
///
/// let feat = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], Context::cpu());
/// assert_eq!(feat.feature_shape(), &[2]);
/// assert!(!feat.transpose(0, 1)?.is_contiguous());
/// # Ok::<(), graphops::error::Error>(())
/// ```
pub struct Tensor {
    storage: Storage,
    layout: Layout,
    context: Context,
}

impl Tensor {
    /// Create a tensor from storage, layout and context
    pub fn from_parts(storage: Storage, layout: Layout, context: Context) -> Self {
        Self {
            storage,
            layout,
            context,
        }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], context: Context) -> Self {
        Self::try_from_slice(data, shape, context).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        context: Context,
    ) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::shape_mismatch("data", shape, &[data.len()]));
        }

        Ok(Self {
            storage: Storage::from_slice(data),
            layout: Layout::contiguous(shape),
            context,
        })
    }

    /// Create a zero-filled tensor
    pub fn zeros(shape: &[usize], dtype: DType, context: Context) -> Self {
        let len: usize = shape.iter().product();
        Self {
            storage: Storage::zeroed(len, dtype),
            layout: Layout::contiguous(shape),
            context,
        }
    }

    /// Create a tensor filled with `value`
    pub fn full<T: Element>(value: T, shape: &[usize], context: Context) -> Self {
        let len: usize = shape.iter().product();
        Self::from_slice(&vec![value; len], shape, context)
    }

    // ===== Accessors =====

    /// Get the underlying storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Shape excluding the leading, graph-bound dimension
    #[inline]
    pub fn feature_shape(&self) -> &[usize] {
        self.shape().get(1..).unwrap_or(&[])
    }

    /// Number of elements per leading-dimension row
    #[inline]
    pub fn row_len(&self) -> usize {
        self.feature_shape().iter().product()
    }

    /// Get the number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device context
    #[inline]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Check if the tensor is memory-contiguous
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// True if both tensors view the same storage
    #[inline]
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    // ===== View Operations (Zero-Copy) =====

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let layout = self
            .layout
            .transpose(dim0, dim1)
            .ok_or_else(|| Error::invalid_argument("dim", format!("{dim0}/{dim1} for {}D tensor", self.ndim())))?;
        Ok(self.with_layout(layout))
    }

    /// Narrow a dimension (zero-copy slice)
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let dim_idx = self
            .layout
            .normalize_dim(dim)
            .ok_or_else(|| Error::invalid_argument("dim", format!("{dim} for {}D tensor", self.ndim())))?;
        let layout = self
            .layout
            .narrow(dim_idx, start, length)
            .ok_or_else(|| {
                Error::shape_mismatch("narrow", &[self.shape()[dim_idx]], &[start, length])
            })?;
        Ok(self.with_layout(layout))
    }

    /// Reshape to a new shape (zero-copy, contiguous tensors only)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if !self.is_contiguous() {
            return Err(Error::NotContiguous { operand: "reshape" });
        }
        let layout = self
            .layout
            .reshape(shape)
            .ok_or_else(|| Error::shape_mismatch("reshape", self.shape(), shape))?;
        Ok(self.with_layout(layout))
    }

    /// Same data, relabeled with another device context
    ///
    /// No transfer happens; this only changes the descriptor.
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
            context,
        }
    }

    fn with_layout(&self, layout: Layout) -> Self {
        Self {
            storage: self.storage.clone(),
            layout,
            context: self.context,
        }
    }

    // ===== Data Access =====

    /// Borrow the viewed elements of a contiguous tensor
    ///
    /// Kernel entry point: fails on dtype mismatch or a strided view.
    pub fn data<T: Element>(&self) -> Result<MappedRwLockReadGuard<'_, [T]>> {
        let range = self.dense_range::<T>()?;
        Ok(MappedRwLockReadGuard::map(self.storage.read::<T>(), |s| &s[range]))
    }

    /// Mutably borrow the viewed elements of a contiguous tensor
    pub fn data_mut<T: Element>(&self) -> Result<MappedRwLockWriteGuard<'_, [T]>> {
        let range = self.dense_range::<T>()?;
        Ok(MappedRwLockWriteGuard::map(self.storage.write::<T>(), |s| &mut s[range]))
    }

    fn dense_range<T: Element>(&self) -> Result<std::ops::Range<usize>> {
        if T::DTYPE != self.dtype() {
            return Err(Error::dtype_mismatch("tensor", T::DTYPE, self.dtype()));
        }
        if !self.is_contiguous() {
            return Err(Error::NotContiguous { operand: "tensor" });
        }
        let start = self.layout.offset();
        Ok(start..start + self.numel())
    }

    /// Copy tensor data to a Vec in logical row-major order
    ///
    /// # Panics
    /// Panics if `T` does not match the tensor dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        let data = self.storage.read::<T>();
        if self.is_contiguous() {
            let start = self.layout.offset();
            return data[start..start + self.numel()].to_vec();
        }

        let shape = self.shape();
        let mut indices = vec![0usize; shape.len()];
        let mut result = Vec::with_capacity(self.numel());
        for _ in 0..self.numel() {
            if let Some(pos) = self.layout.index(&indices) {
                result.push(data[pos]);
            }
            for d in (0..shape.len()).rev() {
                indices[d] += 1;
                if indices[d] < shape[d] {
                    break;
                }
                indices[d] = 0;
            }
        }
        result
    }
}

impl Clone for Tensor {
    /// Clone creates a new descriptor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        self.with_layout(self.layout.clone())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("context", &self.context)
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_shape_checked() {
        let err = Tensor::try_from_slice(&[1.0f32, 2.0, 3.0], &[2, 2], Context::cpu()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_feature_shape_and_row_len() {
        let t = Tensor::zeros(&[5, 2, 3], DType::F32, Context::cpu());
        assert_eq!(t.feature_shape(), &[2, 3]);
        assert_eq!(t.row_len(), 6);
        let v = Tensor::zeros(&[5], DType::F32, Context::cpu());
        assert!(v.feature_shape().is_empty());
    }

    #[test]
    fn test_to_vec_strided() {
        let t = Tensor::from_slice(&[1i64, 2, 3, 4, 5, 6], &[2, 3], Context::cpu());
        let tt = t.transpose(0, 1).unwrap();
        assert_eq!(tt.to_vec::<i64>(), vec![1, 4, 2, 5, 3, 6]);
        assert!(tt.data::<i64>().is_err());
    }

    #[test]
    fn test_narrow_rows_data() {
        let t = Tensor::from_slice(&[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0], &[3, 2], Context::cpu());
        let rows = t.narrow(0, 1, 2).unwrap();
        assert_eq!(&*rows.data::<f64>().unwrap(), &[2.0, 3.0, 4.0, 5.0]);
        rows.data_mut::<f64>().unwrap()[0] = 9.0;
        assert_eq!(t.to_vec::<f64>()[2], 9.0);
    }

    #[test]
    fn test_data_dtype_mismatch() {
        let t = Tensor::zeros(&[2, 1], DType::I32, Context::cpu());
        assert!(matches!(t.data::<i64>(), Err(Error::DTypeMismatch { .. })));
    }
}
