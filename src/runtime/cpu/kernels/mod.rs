//! CPU reference kernels
//!
//! Kernels borrow typed slices from the operand tensors, accumulate in f64
//! and store back in the feature width `F`. Row-parallel loops use rayon when
//! the `rayon` feature is enabled; each task owns disjoint output rows.

pub mod sddmm;
pub mod segment;
pub mod spmm;

use crate::dtype::IndexElement;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One output row together with its optional arg rows
pub(crate) struct RowSlot<'a, F, I> {
    /// Row number in the output
    pub index: usize,
    /// Output elements of this row
    pub out: &'a mut [F],
    /// First arg output row, if provided
    pub arg_a: Option<&'a mut [I]>,
    /// Second arg output row, if provided
    pub arg_b: Option<&'a mut [I]>,
}

fn split_rows<T>(data: Option<&mut [T]>, row_len: usize, rows: usize) -> Vec<Option<&mut [T]>> {
    match data {
        Some(data) => data.chunks_mut(row_len).map(Some).collect(),
        None => (0..rows).map(|_| None).collect(),
    }
}

/// Run `f` once per output row, in parallel when enabled
///
/// `row_len` must be non-zero and divide `out.len()`; arg buffers must have
/// the same length as `out`.
pub(crate) fn for_each_row<F, I, Op>(
    out: &mut [F],
    arg_a: Option<&mut [I]>,
    arg_b: Option<&mut [I]>,
    row_len: usize,
    min_rows: usize,
    f: Op,
) where
    F: Send,
    I: Send,
    Op: Fn(RowSlot<'_, F, I>) + Send + Sync,
{
    let rows = out.len() / row_len;
    let slots: Vec<RowSlot<'_, F, I>> = out
        .chunks_mut(row_len)
        .zip(split_rows(arg_a, row_len, rows))
        .zip(split_rows(arg_b, row_len, rows))
        .enumerate()
        .map(|(index, ((out, arg_a), arg_b))| RowSlot {
            index,
            out,
            arg_a,
            arg_b,
        })
        .collect();

    #[cfg(feature = "rayon")]
    {
        slots.into_par_iter().with_min_len(min_rows.max(1)).for_each(f);
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = min_rows;
        slots.into_iter().for_each(f);
    }
}

/// Position of a validated index value
///
/// Topology arrays are bounds-checked at construction, so negative values
/// never reach a kernel.
#[inline]
pub(crate) fn pos<I: IndexElement>(v: I) -> usize {
    v.to_index().unwrap_or(usize::MAX)
}

/// Edge id stored at position `p`, identity when no id array exists
#[inline]
pub(crate) fn edge_id<I: IndexElement>(eids: Option<&[I]>, p: usize) -> usize {
    eids.map_or(p, |ids| pos(ids[p]))
}
