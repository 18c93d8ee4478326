//! COO format conversion: to_csr, to_csc

use super::CooMatrix;
use crate::error::Result;
use crate::sparse::{counting_sort, index_tensor, read_positions, CscMatrix, CsrMatrix};

impl CooMatrix {
    /// Edge id of every stored entry, materializing positional ids
    pub(crate) fn edge_id_positions(&self) -> Result<Vec<usize>> {
        match &self.data {
            Some(data) => read_positions(data, self.nnz()),
            None => Ok((0..self.nnz()).collect()),
        }
    }

    /// Convert to CSR format
    ///
    /// Entries are grouped by source vertex with a stable counting sort, so
    /// out-edges of one source keep their COO order. The result always carries
    /// an explicit edge-id array.
    pub fn to_csr(&self) -> Result<CsrMatrix> {
        let rows = read_positions(&self.row, self.num_rows)?;
        let cols = read_positions(&self.col, self.num_cols)?;
        let eids = self.edge_id_positions()?;
        let (indptr, perm) = counting_sort(&rows, self.num_rows);

        let indices: Vec<usize> = perm.iter().map(|&p| cols[p]).collect();
        let data: Vec<usize> = perm.iter().map(|&p| eids[p]).collect();

        let (id_type, ctx) = (self.id_type(), self.context());
        CsrMatrix::new(
            index_tensor(&indptr, id_type, ctx),
            index_tensor(&indices, id_type, ctx),
            Some(index_tensor(&data, id_type, ctx)),
            self.num_rows,
            self.num_cols,
        )
    }

    /// Convert to CSC format
    ///
    /// Entries are grouped by destination vertex with a stable counting sort,
    /// so in-edges of one destination keep their COO order. The result always
    /// carries an explicit edge-id array.
    pub fn to_csc(&self) -> Result<CscMatrix> {
        let rows = read_positions(&self.row, self.num_rows)?;
        let cols = read_positions(&self.col, self.num_cols)?;
        let eids = self.edge_id_positions()?;
        let (indptr, perm) = counting_sort(&cols, self.num_cols);

        let indices: Vec<usize> = perm.iter().map(|&p| rows[p]).collect();
        let data: Vec<usize> = perm.iter().map(|&p| eids[p]).collect();

        let (id_type, ctx) = (self.id_type(), self.context());
        CscMatrix::new(
            index_tensor(&indptr, id_type, ctx),
            index_tensor(&indices, id_type, ctx),
            Some(index_tensor(&data, id_type, ctx)),
            self.num_rows,
            self.num_cols,
        )
    }
}
