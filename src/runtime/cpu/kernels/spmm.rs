//! SpMM kernels: per-destination reduce of combined source/edge features
//!
//! The CSC kernel is destination-major and parallel over destinations. The
//! COO kernel walks edges in storage order into an f64 accumulator; since CSC
//! is built from COO by a stable sort, both visit each destination's in-edges
//! in the same order and pick the same max/min winner.

use super::{edge_id, for_each_row, pos};
use crate::dtype::{FloatElement, IndexElement};
use crate::error::Result;
use crate::ops::{BcastOff, BinaryOp, ReduceOp};
use crate::runtime::SpmmArgs;
use crate::sparse::{CooMatrix, CscMatrix};
use crate::tensor::Tensor;
use parking_lot::MappedRwLockWriteGuard;

/// Feature rows read by one edge
struct EdgeOperands<'a, F> {
    op: BinaryOp,
    bcast: &'a BcastOff,
    ufeat: Option<&'a [F]>,
    efeat: Option<&'a [F]>,
}

impl<F: FloatElement> EdgeOperands<'_, F> {
    /// `op(ufeat[u], efeat[e])` at output position `k`
    #[inline]
    fn value(&self, u: usize, e: usize, k: usize) -> f64 {
        let b = self.bcast;
        let lhs = self
            .ufeat
            .map_or(0.0, |x| x[u * b.lhs_len + b.lhs_index(k)].to_f64());
        let rhs = self
            .efeat
            .map_or(0.0, |x| x[e * b.rhs_len + b.rhs_index(k)].to_f64());
        self.op.combine(lhs, rhs)
    }
}

/// Running reduce state for one output row
struct Accumulator {
    reduce: ReduceOp,
    value: Vec<f64>,
    arg_u: Vec<Option<usize>>,
    arg_e: Vec<Option<usize>>,
    seen: bool,
}

impl Accumulator {
    fn new(reduce: ReduceOp, len: usize) -> Self {
        Self {
            reduce,
            value: vec![reduce.identity(); len],
            arg_u: vec![None; len],
            arg_e: vec![None; len],
            seen: false,
        }
    }

    #[inline]
    fn push(&mut self, k: usize, val: f64, u: usize, e: usize) {
        self.seen = true;
        match self.reduce {
            ReduceOp::Sum => self.value[k] += val,
            ReduceOp::Max | ReduceOp::Min => {
                if self.reduce.improves(self.value[k], val) {
                    self.value[k] = val;
                    self.arg_u[k] = Some(u);
                    self.arg_e[k] = Some(e);
                }
            }
        }
    }

    /// Store the row; destinations without in-edges get 0 and no winner
    fn store<F: FloatElement, I: IndexElement>(
        &self,
        out: &mut [F],
        arg_u: Option<&mut [I]>,
        arg_e: Option<&mut [I]>,
    ) {
        for (o, &v) in out.iter_mut().zip(&self.value) {
            *o = F::from_f64(if self.seen { v } else { 0.0 });
        }
        let to_index = |a: &Option<usize>| a.map_or(I::NONE, I::from_index);
        if let Some(arg_u) = arg_u {
            for (slot, a) in arg_u.iter_mut().zip(&self.arg_u) {
                *slot = to_index(a);
            }
        }
        if let Some(arg_e) = arg_e {
            for (slot, a) in arg_e.iter_mut().zip(&self.arg_e) {
                *slot = to_index(a);
            }
        }
    }
}

/// Lock the arg outputs only for reduces that record a winner
fn arg_slices<'t, I: IndexElement>(
    reduce: ReduceOp,
    arg_u: Option<&'t Tensor>,
    arg_e: Option<&'t Tensor>,
) -> Result<(Option<MappedRwLockWriteGuard<'t, [I]>>, Option<MappedRwLockWriteGuard<'t, [I]>>)> {
    if !reduce.needs_arg() {
        return Ok((None, None));
    }
    Ok((
        arg_u.map(|t| t.data_mut::<I>()).transpose()?,
        arg_e.map(|t| t.data_mut::<I>()).transpose()?,
    ))
}

/// SpMM over the in-edge structure
pub fn spmm_csc<I: IndexElement, F: FloatElement>(
    args: &SpmmArgs<'_, CscMatrix>,
    min_rows: usize,
) -> Result<()> {
    let out_len = args.bcast.out_len;
    if out_len == 0 {
        return Ok(());
    }

    let indptr = args.matrix.indptr().data::<I>()?;
    let indices = args.matrix.indices().data::<I>()?;
    let eids = args.matrix.edge_ids().map(|t| t.data::<I>()).transpose()?;
    let ufeat = args.ufeat.map(|t| t.data::<F>()).transpose()?;
    let efeat = args.efeat.map(|t| t.data::<F>()).transpose()?;
    let mut out = args.out.data_mut::<F>()?;
    let (mut arg_u, mut arg_e) = arg_slices::<I>(args.reduce, args.arg_u, args.arg_e)?;

    let operands = EdgeOperands {
        op: args.op,
        bcast: args.bcast,
        ufeat: ufeat.as_deref().filter(|_| args.op.uses_lhs()),
        efeat: efeat.as_deref().filter(|_| args.op.uses_rhs()),
    };
    let (indptr, indices, eids) = (&*indptr, &*indices, eids.as_deref());
    let reduce = args.reduce;

    for_each_row(
        &mut out[..],
        arg_u.as_deref_mut(),
        arg_e.as_deref_mut(),
        out_len,
        min_rows,
        |slot| {
            let v = slot.index;
            let mut acc = Accumulator::new(reduce, out_len);
            for p in pos(indptr[v])..pos(indptr[v + 1]) {
                let u = pos(indices[p]);
                let e = edge_id(eids, p);
                for k in 0..out_len {
                    acc.push(k, operands.value(u, e, k), u, e);
                }
            }
            acc.store(slot.out, slot.arg_a, slot.arg_b);
        },
    );
    Ok(())
}

/// SpMM over the coordinate structure, edge-major
///
/// Serial: edges of one destination are scattered through the array, so rows
/// cannot be split across threads without a CSC build.
pub fn spmm_coo<I: IndexElement, F: FloatElement>(args: &SpmmArgs<'_, CooMatrix>) -> Result<()> {
    let out_len = args.bcast.out_len;
    if out_len == 0 {
        return Ok(());
    }

    let coo = args.matrix;
    let row = coo.row().data::<I>()?;
    let col = coo.col().data::<I>()?;
    let eids = coo.edge_ids().map(|t| t.data::<I>()).transpose()?;
    let ufeat = args.ufeat.map(|t| t.data::<F>()).transpose()?;
    let efeat = args.efeat.map(|t| t.data::<F>()).transpose()?;

    let operands = EdgeOperands {
        op: args.op,
        bcast: args.bcast,
        ufeat: ufeat.as_deref().filter(|_| args.op.uses_lhs()),
        efeat: efeat.as_deref().filter(|_| args.op.uses_rhs()),
    };

    let mut rows: Vec<Accumulator> = (0..coo.num_cols())
        .map(|_| Accumulator::new(args.reduce, out_len))
        .collect();
    for p in 0..coo.nnz() {
        let (u, v) = (pos(row[p]), pos(col[p]));
        let e = edge_id(eids.as_deref(), p);
        let acc = &mut rows[v];
        for k in 0..out_len {
            acc.push(k, operands.value(u, e, k), u, e);
        }
    }

    let mut out = args.out.data_mut::<F>()?;
    let (mut arg_u, mut arg_e) = arg_slices::<I>(args.reduce, args.arg_u, args.arg_e)?;
    for (v, acc) in rows.iter().enumerate() {
        let span = v * out_len..(v + 1) * out_len;
        acc.store(
            &mut out[span.clone()],
            arg_u.as_deref_mut().map(|a| &mut a[span.clone()]),
            arg_e.as_deref_mut().map(|a| &mut a[span.clone()]),
        );
    }
    Ok(())
}
