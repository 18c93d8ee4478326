//! Segment reduce and its backward scatter

use super::{for_each_row, pos};
use crate::dtype::{FloatElement, IndexElement};
use crate::error::{Error, Result};
use crate::runtime::{BackwardSegmentCmpArgs, SegmentReduceArgs};

/// Reduce rows `offsets[s]..offsets[s + 1]` of `feat` into row `s` of `out`
///
/// Empty segments produce the reduce identity with arg `-1`. The arg records
/// the winning row of `feat`, not the position inside the segment. A sum
/// leaves `arg` untouched.
pub fn segment_reduce<I: IndexElement, F: FloatElement>(
    args: &SegmentReduceArgs<'_>,
    min_rows: usize,
) -> Result<()> {
    let dim = args.feat.row_len();
    if dim == 0 {
        return Ok(());
    }

    let feat = args.feat.data::<F>()?;
    let offsets = args.offsets.data::<I>()?;
    let mut out = args.out.data_mut::<F>()?;
    let mut arg = args
        .arg
        .filter(|_| args.op.needs_arg())
        .map(|t| t.data_mut::<I>())
        .transpose()?;
    let (feat, offsets, op) = (&*feat, &*offsets, args.op);

    for_each_row(&mut out[..], arg.as_deref_mut(), None, dim, min_rows, |slot| {
        let s = slot.index;
        let rows = pos(offsets[s])..pos(offsets[s + 1]);
        let mut arg_row = slot.arg_a;
        for k in 0..dim {
            let mut acc = op.identity();
            let mut winner = None;
            for r in rows.clone() {
                let val = feat[r * dim + k].to_f64();
                if op.needs_arg() {
                    if op.improves(acc, val) {
                        acc = val;
                        winner = Some(r);
                    }
                } else {
                    acc += val;
                }
            }
            slot.out[k] = F::from_f64(acc);
            if let Some(a) = arg_row.as_deref_mut() {
                a[k] = winner.map_or(I::NONE, I::from_index);
            }
        }
    });
    Ok(())
}

/// Scatter `feat[i, k]` into `out[arg[i, k], k]`, skipping `-1`
///
/// All arg values are checked against `out`'s row count before any write.
pub fn backward_segment_cmp<I: IndexElement, F: FloatElement>(
    args: &BackwardSegmentCmpArgs<'_>,
) -> Result<()> {
    let dim = args.feat.row_len();
    if dim == 0 {
        return Ok(());
    }

    let feat = args.feat.data::<F>()?;
    let arg = args.arg.data::<I>()?;
    let num_rows = args.out.shape()[0];
    for &a in arg.iter() {
        if a != I::NONE {
            match a.to_index() {
                Some(r) if r < num_rows => {}
                _ => {
                    return Err(Error::IndexOutOfBounds {
                        index: a.to_index().unwrap_or(usize::MAX),
                        size: num_rows,
                    })
                }
            }
        }
    }

    let mut out = args.out.data_mut::<F>()?;
    for (i, (&g, &a)) in feat.iter().zip(arg.iter()).enumerate() {
        if let Some(r) = a.to_index() {
            let k = i % dim;
            let slot = &mut out[r * dim + k];
            *slot = F::from_f64(slot.to_f64() + g.to_f64());
        }
    }
    Ok(())
}
