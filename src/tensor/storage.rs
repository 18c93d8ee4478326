//! Storage: caller-owned memory with Arc-based sharing

use crate::dtype::{DType, Element};
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Storage for tensor data
///
/// Storage wraps a buffer with reference counting, enabling zero-copy views
/// (transpose, narrow, ...) that share the underlying memory. The buffer is
/// backed by `u64` words so every supported element type is correctly aligned.
///
/// Kernels write outputs in place through a shared reference; the buffer
/// lock serializes a writer against readers of the same storage.
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    words: RwLock<Vec<u64>>,
    /// Number of elements (not bytes)
    len: usize,
    dtype: DType,
}

impl Storage {
    /// Allocate zero-initialized storage for `len` elements of `dtype`
    pub fn zeroed(len: usize, dtype: DType) -> Self {
        let bytes = len * dtype.size_in_bytes();
        let words = vec![0u64; bytes.div_ceil(8)];
        Self {
            inner: Arc::new(StorageInner {
                words: RwLock::new(words),
                len,
                dtype,
            }),
        }
    }

    /// Create storage holding a copy of `data`
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        let storage = Self::zeroed(data.len(), T::DTYPE);
        storage.write::<T>().copy_from_slice(data);
        storage
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * self.inner.dtype.size_in_bytes()
    }

    /// True if both handles refer to the same buffer
    #[inline]
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Borrow the whole buffer as `[T]`
    ///
    /// # Panics
    /// Panics if `T` does not match the storage dtype.
    pub fn read<T: Element>(&self) -> MappedRwLockReadGuard<'_, [T]> {
        assert_eq!(T::DTYPE, self.inner.dtype, "storage dtype mismatch");
        let len = self.inner.len;
        RwLockReadGuard::map(self.inner.words.read(), |words| {
            &bytemuck::cast_slice::<u64, T>(words.as_slice())[..len]
        })
    }

    /// Mutably borrow the whole buffer as `[T]`
    ///
    /// # Panics
    /// Panics if `T` does not match the storage dtype.
    pub fn write<T: Element>(&self) -> MappedRwLockWriteGuard<'_, [T]> {
        assert_eq!(T::DTYPE, self.inner.dtype, "storage dtype mismatch");
        let len = self.inner.len;
        RwLockWriteGuard::map(self.inner.words.write(), |words| {
            &mut bytemuck::cast_slice_mut::<u64, T>(words.as_mut_slice())[..len]
        })
    }
}

impl Clone for Storage {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_alignment() {
        let s = Storage::from_slice(&[1.0f64, 2.0, 3.0]);
        assert_eq!(&*s.read::<f64>(), &[1.0, 2.0, 3.0]);

        let odd = Storage::from_slice(&[7i32, 8, 9]);
        assert_eq!(odd.size_in_bytes(), 12);
        assert_eq!(&*odd.read::<i32>(), &[7, 8, 9]);
    }

    #[test]
    fn test_shared_write_visible_through_clone() {
        let s = Storage::zeroed(4, DType::F32);
        let view = s.clone();
        view.write::<f32>()[2] = 5.0;
        assert_eq!(s.read::<f32>()[2], 5.0);
        assert!(s.ptr_eq(&view));
        assert_eq!(s.ref_count(), 2);
    }

    #[test]
    #[should_panic(expected = "storage dtype mismatch")]
    fn test_dtype_checked() {
        let s = Storage::zeroed(2, DType::I64);
        let _ = s.read::<f64>();
    }
}
