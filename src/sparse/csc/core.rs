//! Core CSC implementation: struct, creation, getters

use crate::dtype::{DType, IdType};
use crate::error::Result;
use crate::runtime::{Context, DeviceType};
use crate::sparse::{check_edge_ids, check_index_array, check_indptr, read_positions, SparseFormat};
use crate::tensor::Tensor;

/// CSC (Compressed Sparse Column) adjacency of one relation
///
/// In-edges of destination `v` occupy positions `indptr[v]..indptr[v + 1]`;
/// `indices` holds their sources.
#[derive(Debug, Clone)]
pub struct CscMatrix {
    pub(crate) indptr: Tensor,
    pub(crate) indices: Tensor,
    pub(crate) data: Option<Tensor>,
    pub(crate) num_rows: usize,
    pub(crate) num_cols: usize,
}

impl CscMatrix {
    /// Create a new CSC matrix from components
    ///
    /// `indptr` has `num_cols + 1` entries; `indices` are source vertices.
    pub fn new(
        indptr: Tensor,
        indices: Tensor,
        data: Option<Tensor>,
        num_rows: usize,
        num_cols: usize,
    ) -> Result<Self> {
        let id_type = IdType::from_dtype(indptr.dtype(), "CscMatrix")?;
        let ctx = indptr.context();
        let nnz = indices.numel();

        check_index_array(&indptr, "indptr", id_type, ctx, num_cols + 1)?;
        check_index_array(&indices, "indices", id_type, ctx, nnz)?;
        if let Some(data) = &data {
            check_index_array(data, "data", id_type, ctx, nnz)?;
        }

        if ctx.device_type == DeviceType::Cpu {
            check_indptr(&read_positions(&indptr, nnz + 1)?, nnz)?;
            read_positions(&indices, num_rows)?;
            if let Some(data) = &data {
                check_edge_ids(data, nnz)?;
            }
        }

        Ok(Self {
            indptr,
            indices,
            data,
            num_rows,
            num_cols,
        })
    }

    /// Column pointers over destination vertices
    pub fn indptr(&self) -> &Tensor {
        &self.indptr
    }

    /// Source vertex per stored edge
    pub fn indices(&self) -> &Tensor {
        &self.indices
    }

    /// Edge id per stored edge, `None` when positions are edge ids
    pub fn edge_ids(&self) -> Option<&Tensor> {
        self.data.as_ref()
    }

    /// Number of source vertices
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of destination vertices
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored edges
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.numel()
    }

    /// Index width of the arrays
    #[inline]
    pub fn id_type(&self) -> IdType {
        match self.indptr.dtype() {
            DType::I32 => IdType::I32,
            _ => IdType::I64,
        }
    }

    /// Device holding the arrays
    #[inline]
    pub fn context(&self) -> Context {
        self.indptr.context()
    }

    /// Storage format tag
    #[inline]
    pub fn format(&self) -> SparseFormat {
        SparseFormat::Csc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_array_spans_destinations() {
        let indptr = Tensor::from_slice(&[0i32, 0, 2], &[3], Context::cpu());
        let indices = Tensor::from_slice(&[1i32, 0], &[2], Context::cpu());
        let csc = CscMatrix::new(indptr, indices, None, 2, 2).unwrap();
        assert_eq!(csc.num_cols(), 2);
        assert_eq!(csc.id_type(), IdType::I32);
    }

    #[test]
    fn test_source_bounds() {
        let indptr = Tensor::from_slice(&[0i32, 1], &[2], Context::cpu());
        let indices = Tensor::from_slice(&[4i32], &[1], Context::cpu());
        assert!(CscMatrix::new(indptr, indices, None, 4, 1).is_err());
    }

    #[test]
    fn test_repeated_edge_id_rejected() {
        let indptr = Tensor::from_slice(&[0i32, 2], &[2], Context::cpu());
        let indices = Tensor::from_slice(&[0i32, 1], &[2], Context::cpu());
        let data = Tensor::from_slice(&[1i32, 1], &[2], Context::cpu());
        assert!(matches!(
            CscMatrix::new(indptr, indices, Some(data), 2, 1),
            Err(crate::error::Error::InvalidArgument { arg: "data", .. })
        ));
    }
}
