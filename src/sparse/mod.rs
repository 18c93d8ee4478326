//! Sparse adjacency structures for graph relations
//!
//! A relation with `num_src` source vertices, `num_dst` destination vertices
//! and `nnz` edges can be stored in three formats. All of them describe the
//! same `[num_src, num_dst]` adjacency matrix:
//!
//! - **COO** (Coordinate): `(row, col)` pairs, one per edge in edge-id order.
//!   Best for edge-major kernels and construction.
//!
//! - **CSR** (Compressed Sparse Row): pointers over source vertices. Each
//!   source's out-edges are contiguous. Best for SDDMM.
//!
//! - **CSC** (Compressed Sparse Column): pointers over destination vertices.
//!   Each destination's in-edges are contiguous. Best for SpMM.
//!
//! Compressed formats reorder edges, so they carry an optional `data` array
//! mapping each stored position back to its edge id. A missing `data` array
//! means positions and edge ids coincide.
//!
//! Index arrays are 1-D tensors of the relation's [`IdType`].
//!
//! ```
//! use graphops::prelude::*;
//! use graphops::sparse::CooMatrix;
//!
//! let coo = CooMatrix::from_slices(&[0i64, 0, 1], &[1, 2, 2], 2, 3, Context::cpu())?;
//! let csc = coo.to_csc()?;
//! assert_eq!(csc.indptr().to_vec::<i64>(), vec![0, 0, 1, 3]);
//! assert_eq!(csc.edge_ids().map(|t| t.to_vec::<i64>()), Some(vec![0, 1, 2]));
//! # Ok::<(), graphops::error::Error>(())
//! ```

mod coo;
mod csc;
mod csr;
mod format;

pub use coo::CooMatrix;
pub use csc::CscMatrix;
pub use csr::CsrMatrix;
pub use format::{FormatCode, SparseFormat};

use crate::dtype::{IdType, IndexElement};
use crate::error::{Error, Result};
use crate::runtime::Context;
use crate::tensor::Tensor;

/// Check that `t` is a 1-D index tensor of `id_type` on `ctx` with `len` entries
pub(crate) fn check_index_array(
    t: &Tensor,
    operand: &'static str,
    id_type: IdType,
    ctx: Context,
    len: usize,
) -> Result<()> {
    if t.dtype() != id_type.dtype() {
        return Err(Error::dtype_mismatch(operand, id_type.dtype(), t.dtype()));
    }
    if t.context() != ctx {
        return Err(Error::ContextMismatch {
            expected: ctx,
            got: t.context(),
            operand,
        });
    }
    if t.ndim() != 1 || t.numel() != len {
        return Err(Error::shape_mismatch(operand, &[len], t.shape()));
    }
    if !t.is_contiguous() {
        return Err(Error::NotContiguous { operand });
    }
    Ok(())
}

/// Read an index tensor as positions, rejecting entries outside `0..bound`
pub(crate) fn read_positions(t: &Tensor, bound: usize) -> Result<Vec<usize>> {
    crate::dispatch_id_type!(IdType::from_dtype(t.dtype(), "read_positions")?, I => {
        let data = t.data::<I>()?;
        let positions: Result<Vec<usize>> = data
            .iter()
            .map(|&v| match v.to_index() {
                Some(i) if i < bound => Ok(i),
                _ => Err(Error::IndexOutOfBounds {
                    index: v.to_index().unwrap_or(usize::MAX),
                    size: bound,
                }),
            })
            .collect();
        positions
    })
}

/// Validate an edge-id array: every id in `0..nnz` appears exactly once
pub(crate) fn check_edge_ids(data: &Tensor, nnz: usize) -> Result<()> {
    let mut seen = vec![false; nnz];
    for e in read_positions(data, nnz)? {
        if std::mem::replace(&mut seen[e], true) {
            return Err(Error::invalid_argument(
                "data",
                format!("edge id {e} appears more than once"),
            ));
        }
    }
    Ok(())
}

/// Validate a compressed pointer array: starts at 0, nondecreasing, ends at `nnz`
pub(crate) fn check_indptr(indptr: &[usize], nnz: usize) -> Result<()> {
    if indptr.first().copied() != Some(0) {
        return Err(Error::invalid_argument("indptr", "must start at 0"));
    }
    if indptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(Error::invalid_argument("indptr", "must be nondecreasing"));
    }
    if indptr.last().copied() != Some(nnz) {
        return Err(Error::invalid_argument(
            "indptr",
            format!("must end at nnz={nnz}, got {:?}", indptr.last()),
        ));
    }
    Ok(())
}

/// Build a 1-D index tensor of `id_type` from positions
pub(crate) fn index_tensor(values: &[usize], id_type: IdType, ctx: Context) -> Tensor {
    crate::dispatch_id_type!(id_type, I => {
        let data: Vec<I> = values.iter().map(|&v| I::from_index(v)).collect();
        Tensor::from_slice(&data, &[data.len()], ctx)
    })
}

/// Stable counting sort of edge positions by `key`, returning `(indptr, perm)`
///
/// `perm[k]` is the original position stored at sorted slot `k`; edges with
/// equal keys keep their relative order.
pub(crate) fn counting_sort(keys: &[usize], num_keys: usize) -> (Vec<usize>, Vec<usize>) {
    let mut indptr = vec![0usize; num_keys + 1];
    for &k in keys {
        indptr[k + 1] += 1;
    }
    for i in 0..num_keys {
        indptr[i + 1] += indptr[i];
    }
    let mut cursor = indptr[..num_keys].to_vec();
    let mut perm = vec![0usize; keys.len()];
    for (pos, &k) in keys.iter().enumerate() {
        perm[cursor[k]] = pos;
        cursor[k] += 1;
    }
    (indptr, perm)
}

/// Expand a pointer array into one key per stored position
pub(crate) fn expand_indptr(indptr: &[usize]) -> Vec<usize> {
    let nnz = indptr.last().copied().unwrap_or(0);
    let mut keys = Vec::with_capacity(nnz);
    for (key, w) in indptr.windows(2).enumerate() {
        keys.extend(std::iter::repeat(key).take(w[1] - w[0]));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_sort_is_stable() {
        let (indptr, perm) = counting_sort(&[2, 0, 2, 1, 0], 3);
        assert_eq!(indptr, vec![0, 2, 3, 5]);
        assert_eq!(perm, vec![1, 4, 3, 0, 2]);
    }

    #[test]
    fn test_expand_indptr() {
        assert_eq!(expand_indptr(&[0, 2, 2, 3]), vec![0, 0, 2]);
        assert!(expand_indptr(&[0]).is_empty());
    }

    #[test]
    fn test_check_indptr() {
        assert!(check_indptr(&[0, 1, 3], 3).is_ok());
        assert!(check_indptr(&[1, 1, 3], 3).is_err());
        assert!(check_indptr(&[0, 2, 1], 1).is_err());
        assert!(check_indptr(&[0, 1, 2], 3).is_err());
    }

    #[test]
    fn test_read_positions_bounds() {
        let t = Tensor::from_slice(&[0i32, 3, 1], &[3], Context::cpu());
        assert_eq!(read_positions(&t, 4).unwrap(), vec![0, 3, 1]);
        assert!(matches!(
            read_positions(&t, 3),
            Err(Error::IndexOutOfBounds { index: 3, size: 3 })
        ));
        let neg = Tensor::from_slice(&[-1i64], &[1], Context::cpu());
        assert!(read_positions(&neg, 10).is_err());
    }
}
