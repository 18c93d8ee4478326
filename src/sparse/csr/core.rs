//! Core CSR implementation: struct, creation, getters

use crate::dtype::{DType, IdType};
use crate::error::Result;
use crate::runtime::{Context, DeviceType};
use crate::sparse::{check_edge_ids, check_index_array, check_indptr, read_positions, SparseFormat};
use crate::tensor::Tensor;

/// CSR (Compressed Sparse Row) adjacency of one relation
///
/// Out-edges of source `u` occupy positions `indptr[u]..indptr[u + 1]`;
/// `indices` holds their destinations.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub(crate) indptr: Tensor,
    pub(crate) indices: Tensor,
    pub(crate) data: Option<Tensor>,
    pub(crate) num_rows: usize,
    pub(crate) num_cols: usize,
}

impl CsrMatrix {
    /// Create a new CSR matrix from components
    ///
    /// # Arguments
    ///
    /// * `indptr` - Row pointers (length: num_rows + 1)
    /// * `indices` - Destination vertex per stored edge
    /// * `data` - Edge id per stored edge, `None` for positional ids
    /// * `num_rows` - Number of source vertices
    /// * `num_cols` - Number of destination vertices
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - indptr length != num_rows + 1, or it is not a valid pointer array
    /// - indices and data have different lengths, dtypes or devices
    /// - any destination or edge id is out of bounds
    /// - an edge id appears more than once
    pub fn new(
        indptr: Tensor,
        indices: Tensor,
        data: Option<Tensor>,
        num_rows: usize,
        num_cols: usize,
    ) -> Result<Self> {
        let id_type = IdType::from_dtype(indptr.dtype(), "CsrMatrix")?;
        let ctx = indptr.context();
        let nnz = indices.numel();

        check_index_array(&indptr, "indptr", id_type, ctx, num_rows + 1)?;
        check_index_array(&indices, "indices", id_type, ctx, nnz)?;
        if let Some(data) = &data {
            check_index_array(data, "data", id_type, ctx, nnz)?;
        }

        if ctx.device_type == DeviceType::Cpu {
            check_indptr(&read_positions(&indptr, nnz + 1)?, nnz)?;
            read_positions(&indices, num_cols)?;
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

    /// Row pointers
    pub fn indptr(&self) -> &Tensor {
        &self.indptr
    }

    /// Destination vertex per stored edge
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
        SparseFormat::Csr
    }
}
