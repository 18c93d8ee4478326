//! SDDMM kernels: one output row per edge
//!
//! Both formats are first resolved to the `(src, dst)` endpoints of every
//! edge id; the per-edge rows are then computed in parallel, each task owning
//! its edge's output row.

use super::{edge_id, for_each_row, pos};
use crate::dtype::{FloatElement, IndexElement};
use crate::error::Result;
use crate::graph::Target;
use crate::runtime::SddmmArgs;
use crate::sparse::{CooMatrix, CsrMatrix};

/// SDDMM over the out-edge structure
pub fn sddmm_csr<I: IndexElement, F: FloatElement>(
    args: &SddmmArgs<'_, CsrMatrix>,
    min_rows: usize,
) -> Result<()> {
    let csr = args.matrix;
    let indptr = csr.indptr().data::<I>()?;
    let indices = csr.indices().data::<I>()?;
    let eids = csr.edge_ids().map(|t| t.data::<I>()).transpose()?;

    let mut endpoints = vec![(0usize, 0usize); csr.nnz()];
    for u in 0..csr.num_rows() {
        for p in pos(indptr[u])..pos(indptr[u + 1]) {
            endpoints[edge_id(eids.as_deref(), p)] = (u, pos(indices[p]));
        }
    }
    sddmm_edges::<I, F, _>(args, &endpoints, min_rows)
}

/// SDDMM over the coordinate structure
pub fn sddmm_coo<I: IndexElement, F: FloatElement>(
    args: &SddmmArgs<'_, CooMatrix>,
    min_rows: usize,
) -> Result<()> {
    let coo = args.matrix;
    let row = coo.row().data::<I>()?;
    let col = coo.col().data::<I>()?;
    let eids = coo.edge_ids().map(|t| t.data::<I>()).transpose()?;

    let mut endpoints = vec![(0usize, 0usize); coo.nnz()];
    for p in 0..coo.nnz() {
        endpoints[edge_id(eids.as_deref(), p)] = (pos(row[p]), pos(col[p]));
    }
    sddmm_edges::<I, F, _>(args, &endpoints, min_rows)
}

/// Compute `out[e] = op(lhs[target(lhs)], rhs[target(rhs)])` for every edge
fn sddmm_edges<I: IndexElement, F: FloatElement, M>(
    args: &SddmmArgs<'_, M>,
    endpoints: &[(usize, usize)],
    min_rows: usize,
) -> Result<()> {
    let b = args.bcast;
    if b.out_len == 0 {
        return Ok(());
    }

    let lhs = args.lhs.map(|t| t.data::<F>()).transpose()?;
    let rhs = args.rhs.map(|t| t.data::<F>()).transpose()?;
    let mut out = args.out.data_mut::<F>()?;
    let (op, lhs_target, rhs_target) = (args.op, args.lhs_target, args.rhs_target);
    let lhs = lhs.as_deref().filter(|_| op.uses_lhs());
    let rhs = rhs.as_deref().filter(|_| op.uses_rhs());

    let select = |target: Target, e: usize| {
        let (u, v) = endpoints[e];
        match target {
            Target::Src => u,
            Target::Edge => e,
            Target::Dst => v,
        }
    };

    for_each_row(&mut out[..], None::<&mut [I]>, None, b.out_len, min_rows, |slot| {
        let e = slot.index;
        let lrow = select(lhs_target, e) * b.lhs_len;
        let rrow = select(rhs_target, e) * b.rhs_len;
        for (k, o) in slot.out.iter_mut().enumerate() {
            let loff = lrow + b.lhs_index(k) * b.reduce_size;
            let roff = rrow + b.rhs_index(k) * b.reduce_size;
            let mut acc = 0.0;
            for i in 0..b.reduce_size {
                let l = lhs.map_or(0.0, |x| x[loff + i].to_f64());
                let r = rhs.map_or(0.0, |x| x[roff + i].to_f64());
                acc += op.combine(l, r);
            }
            *o = F::from_f64(acc);
        }
    });
    Ok(())
}
