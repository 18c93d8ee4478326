//! Core COO implementation: struct, creation, getters

use crate::dtype::{DType, IdType, IndexElement};
use crate::error::{Error, Result};
use crate::runtime::{Context, DeviceType};
use crate::sparse::{check_edge_ids, check_index_array, read_positions, SparseFormat};
use crate::tensor::Tensor;

/// COO (Coordinate) adjacency of one relation
///
/// Entry `k` is an edge from source `row[k]` to destination `col[k]`.
#[derive(Debug, Clone)]
pub struct CooMatrix {
    pub(crate) row: Tensor,
    pub(crate) col: Tensor,
    pub(crate) data: Option<Tensor>,
    pub(crate) num_rows: usize,
    pub(crate) num_cols: usize,
}

impl CooMatrix {
    /// Create a COO matrix from components
    ///
    /// # Arguments
    ///
    /// * `row` - Source vertex of each edge
    /// * `col` - Destination vertex of each edge
    /// * `data` - Edge id of each stored entry, `None` for positional ids
    /// * `num_rows` - Number of source vertices
    /// * `num_cols` - Number of destination vertices
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `row` is not an I32/I64 tensor, or `col`/`data` have another dtype
    /// - arrays have different lengths or devices
    /// - any vertex or edge id is out of bounds
    /// - an edge id appears more than once
    pub fn new(
        row: Tensor,
        col: Tensor,
        data: Option<Tensor>,
        num_rows: usize,
        num_cols: usize,
    ) -> Result<Self> {
        let id_type = IdType::from_dtype(row.dtype(), "CooMatrix")?;
        let ctx = row.context();
        let nnz = row.numel();

        check_index_array(&row, "row", id_type, ctx, nnz)?;
        check_index_array(&col, "col", id_type, ctx, nnz)?;
        if let Some(data) = &data {
            check_index_array(data, "data", id_type, ctx, nnz)?;
        }

        if ctx.device_type == DeviceType::Cpu {
            read_positions(&row, num_rows)?;
            read_positions(&col, num_cols)?;
            if let Some(data) = &data {
                check_edge_ids(data, nnz)?;
            }
        }

        Ok(Self {
            row,
            col,
            data,
            num_rows,
            num_cols,
        })
    }

    /// Create a COO matrix from host slices with positional edge ids
    pub fn from_slices<I: IndexElement>(
        row: &[I],
        col: &[I],
        num_rows: usize,
        num_cols: usize,
        ctx: Context,
    ) -> Result<Self> {
        if row.len() != col.len() {
            return Err(Error::shape_mismatch("col", &[row.len()], &[col.len()]));
        }
        Self::new(
            Tensor::from_slice(row, &[row.len()], ctx),
            Tensor::from_slice(col, &[col.len()], ctx),
            None,
            num_rows,
            num_cols,
        )
    }

    /// Source vertex per entry
    pub fn row(&self) -> &Tensor {
        &self.row
    }

    /// Destination vertex per entry
    pub fn col(&self) -> &Tensor {
        &self.col
    }

    /// Edge id per entry, `None` when entries are in edge-id order
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
        self.row.numel()
    }

    /// Index width of the arrays
    #[inline]
    pub fn id_type(&self) -> IdType {
        match self.row.dtype() {
            DType::I32 => IdType::I32,
            _ => IdType::I64,
        }
    }

    /// Device holding the arrays
    #[inline]
    pub fn context(&self) -> Context {
        self.row.context()
    }

    /// Storage format tag
    #[inline]
    pub fn format(&self) -> SparseFormat {
        SparseFormat::Coo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_bounds() {
        let err = CooMatrix::from_slices(&[0i32, 2], &[1, 1], 2, 2, Context::cpu()).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 2, size: 2 }));
    }

    #[test]
    fn test_new_rejects_mixed_dtypes() {
        let row = Tensor::from_slice(&[0i32, 1], &[2], Context::cpu());
        let col = Tensor::from_slice(&[0i64, 1], &[2], Context::cpu());
        assert!(matches!(
            CooMatrix::new(row, col, None, 2, 2),
            Err(Error::DTypeMismatch { operand: "col", .. })
        ));
    }

    #[test]
    fn test_new_rejects_float_indices() {
        let row = Tensor::from_slice(&[0.0f32], &[1], Context::cpu());
        let col = Tensor::from_slice(&[0.0f32], &[1], Context::cpu());
        assert!(matches!(
            CooMatrix::new(row, col, None, 1, 1),
            Err(Error::UnsupportedDType { .. })
        ));
    }

    #[test]
    fn test_edge_ids_bounded_by_nnz() {
        let row = Tensor::from_slice(&[0i64, 1], &[2], Context::cpu());
        let col = Tensor::from_slice(&[1i64, 0], &[2], Context::cpu());
        let data = Tensor::from_slice(&[1i64, 2], &[2], Context::cpu());
        assert!(CooMatrix::new(row, col, Some(data), 2, 2).is_err());
    }

    #[test]
    fn test_edge_ids_must_be_distinct() {
        let row = Tensor::from_slice(&[0i64, 1], &[2], Context::cpu());
        let col = Tensor::from_slice(&[1i64, 0], &[2], Context::cpu());
        let data = Tensor::from_slice(&[0i64, 0], &[2], Context::cpu());
        assert!(matches!(
            CooMatrix::new(row.clone(), col.clone(), Some(data), 2, 2),
            Err(Error::InvalidArgument { arg: "data", .. })
        ));

        let data = Tensor::from_slice(&[1i64, 0], &[2], Context::cpu());
        assert!(CooMatrix::new(row, col, Some(data), 2, 2).is_ok());
    }

    #[test]
    fn test_getters() {
        let coo = CooMatrix::from_slices(&[0i64, 1, 1], &[1, 0, 2], 2, 3, Context::cpu()).unwrap();
        assert_eq!(coo.nnz(), 3);
        assert_eq!(coo.id_type(), IdType::I64);
        assert_eq!((coo.num_rows(), coo.num_cols()), (2, 3));
        assert!(coo.edge_ids().is_none());
        assert_eq!(coo.col().to_vec::<i64>(), vec![1, 0, 2]);
    }
}
