//! CSC format conversion: to_coo

use super::CscMatrix;
use crate::error::Result;
use crate::sparse::{expand_indptr, index_tensor, read_positions, CooMatrix};

impl CscMatrix {
    /// Convert to COO format
    ///
    /// Entries stay in CSC storage order; the edge-id array is carried over.
    pub fn to_coo(&self) -> Result<CooMatrix> {
        let indptr = read_positions(&self.indptr, self.nnz() + 1)?;
        let cols = expand_indptr(&indptr);
        CooMatrix::new(
            self.indices.clone(),
            index_tensor(&cols, self.id_type(), self.context()),
            self.data.clone(),
            self.num_rows,
            self.num_cols,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::Context;
    use crate::sparse::CooMatrix;

    #[test]
    fn test_csc_to_coo_groups_by_destination() {
        let coo = CooMatrix::from_slices(&[0i32, 1, 0], &[1, 0, 0], 2, 2, Context::cpu()).unwrap();
        let back = coo.to_csc().unwrap().to_coo().unwrap();
        assert_eq!(back.row().to_vec::<i32>(), vec![1, 0, 0]);
        assert_eq!(back.col().to_vec::<i32>(), vec![0, 0, 1]);
        assert_eq!(back.edge_ids().unwrap().to_vec::<i32>(), vec![1, 2, 0]);
    }
}
