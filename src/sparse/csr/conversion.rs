//! CSR format conversion: to_coo

use super::CsrMatrix;
use crate::error::Result;
use crate::sparse::{expand_indptr, index_tensor, read_positions, CooMatrix};

impl CsrMatrix {
    /// Convert to COO format
    ///
    /// Entries stay in CSR storage order; the edge-id array is carried over.
    pub fn to_coo(&self) -> Result<CooMatrix> {
        let indptr = read_positions(&self.indptr, self.nnz() + 1)?;
        let rows = expand_indptr(&indptr);
        CooMatrix::new(
            index_tensor(&rows, self.id_type(), self.context()),
            self.indices.clone(),
            self.data.clone(),
            self.num_rows,
            self.num_cols,
        )
    }
}
