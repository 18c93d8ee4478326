//! Segment reduce and its backward compare scatter

use super::validate::{check_contiguous, check_ctx, check_dtype, check_no_alias, check_same_shape};
use super::{Engine, ReduceOp};
use crate::dtype::{FloatType, IdType, IndexElement};
use crate::error::{Error, Result};
use crate::runtime::{BackwardSegmentCmpArgs, DeviceType, SegmentReduceArgs, SparseKernels};
use crate::tensor::Tensor;

/// Require shape `[rows, ..reference.feature_shape()]`
fn check_rows(name: &'static str, t: &Tensor, rows: usize, reference: &Tensor) -> Result<()> {
    let mut expected = Vec::with_capacity(reference.ndim().max(1));
    expected.push(rows);
    expected.extend_from_slice(reference.feature_shape());
    if t.shape() != expected.as_slice() {
        return Err(Error::shape_mismatch(name, &expected, t.shape()));
    }
    Ok(())
}

/// Offsets must start at 0, never decrease and end at the row count
fn check_offsets<I: IndexElement>(offsets: &[I], num_rows: usize) -> Result<()> {
    let mut prev = 0usize;
    for (s, &o) in offsets.iter().enumerate() {
        let o = o
            .to_index()
            .ok_or_else(|| Error::invalid_argument("offsets", format!("negative offset at {s}")))?;
        if (s == 0 && o != 0) || o < prev {
            return Err(Error::invalid_argument(
                "offsets",
                format!("offsets must start at 0 and be non-decreasing, got {o} at {s}"),
            ));
        }
        prev = o;
    }
    if prev != num_rows {
        return Err(Error::invalid_argument(
            "offsets",
            format!("last offset {prev} does not match {num_rows} input rows"),
        ));
    }
    Ok(())
}

impl<A: SparseKernels> Engine<A> {
    /// Reduce contiguous row segments of `feat`
    ///
    /// Segment `s` covers rows `offsets[s]..offsets[s + 1]` and is reduced
    /// into `out[s]`. With `max`/`min`, `arg[s, k]` receives the winning row
    /// of `feat` (`-1` for an empty segment) and must be provided.
    ///
    /// ```
    /// use graphops::prelude::*;
    ///
    /// let feat = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0], &[5, 1], Context::cpu());
    /// let offsets = Tensor::from_slice(&[0i64, 2, 2, 5], &[4], Context::cpu());
    /// let out = Tensor::zeros(&[3, 1], DType::F32, Context::cpu());
    ///
    /// Engine::new().segment_reduce(ReduceOp::Sum, &feat, &offsets, &out, None)?;
    /// assert_eq!(out.to_vec::<f32>(), vec![3.0, 0.0, 12.0]);
    /// # Ok::<(), graphops::error::Error>(())
    /// ```
    pub fn segment_reduce(
        &self,
        op: ReduceOp,
        feat: &Tensor,
        offsets: &Tensor,
        out: &Tensor,
        arg: Option<&Tensor>,
    ) -> Result<()> {
        let span = tracing::debug_span!("segment_reduce", %op, device = %feat.context());
        let _enter = span.enter();

        let ctx = feat.context();
        let operands = [
            ("feat", Some(feat)),
            ("offsets", Some(offsets)),
            ("out", Some(out)),
            ("arg", arg),
        ];
        check_ctx(ctx, &operands)?;
        check_contiguous(&operands)?;
        if feat.ndim() == 0 {
            return Err(Error::RankTooSmall {
                operand: "feat",
                ndim: 0,
            });
        }
        if op.needs_arg() && arg.is_none() {
            return Err(Error::invalid_argument("arg", format!("required by the {op} reduce")));
        }

        let id_type = IdType::from_dtype(offsets.dtype(), "SegmentReduce")?;
        if offsets.ndim() != 1 || offsets.numel() == 0 {
            return Err(Error::invalid_argument(
                "offsets",
                format!("expected a 1-D tensor of n + 1 boundaries, got shape {:?}", offsets.shape()),
            ));
        }
        let num_segments = offsets.numel() - 1;
        check_rows("out", out, num_segments, feat)?;
        if let Some(arg) = arg {
            check_same_shape("arg", arg, out)?;
        }
        check_no_alias(&[("out", Some(out)), ("arg", arg)], &[("feat", Some(feat)), ("offsets", Some(offsets))])?;

        FloatType::from_dtype(out.dtype(), "SegmentReduce")?;
        check_dtype(out.dtype(), &[("feat", Some(feat))])?;
        check_dtype(offsets.dtype(), &[("arg", arg)])?;

        if ctx.device_type == DeviceType::Cpu {
            crate::dispatch_id_type!(id_type, I => {
                check_offsets::<I>(&offsets.data::<I>()?, feat.shape()[0])
            })?;
        }

        let kargs = SegmentReduceArgs {
            op,
            feat,
            offsets,
            out,
            arg,
        };
        crate::dispatch_device!(self, ctx, "SegmentReduce", K => {
            tracing::debug!(kernels = K.name(), ?id_type, dtype = %out.dtype(), num_segments, "dispatch");
            crate::dispatch_id_type!(id_type, I => {
                crate::dispatch_float_type!(out.dtype(), F => {
                    K.segment_reduce::<I, F>(&kargs)
                }, "SegmentReduce")
            })
        })
    }

    /// [`segment_reduce`](Self::segment_reduce) with a reduce name
    pub fn segment_reduce_str(
        &self,
        op: &str,
        feat: &Tensor,
        offsets: &Tensor,
        out: &Tensor,
        arg: Option<&Tensor>,
    ) -> Result<()> {
        self.segment_reduce(op.parse()?, feat, offsets, out, arg)
    }

    /// Backward of a max/min segment reduce
    ///
    /// Adds `feat[i, k]` into `out[arg[i, k], k]` for every recorded winner
    /// and skips `-1`. `out` is accumulated into, so callers zero it first.
    ///
    /// # Errors
    ///
    /// Besides the usual context, dtype and shape checks, fails with
    /// `IndexOutOfBounds` before writing anything when an arg value does not
    /// address a row of `out`.
    pub fn backward_segment_cmp(&self, feat: &Tensor, arg: &Tensor, out: &Tensor) -> Result<()> {
        let span = tracing::debug_span!("backward_segment_cmp", device = %feat.context());
        let _enter = span.enter();

        let ctx = feat.context();
        let operands = [("feat", Some(feat)), ("arg", Some(arg)), ("out", Some(out))];
        check_ctx(ctx, &operands)?;
        check_contiguous(&operands)?;
        if feat.ndim() == 0 {
            return Err(Error::RankTooSmall {
                operand: "feat",
                ndim: 0,
            });
        }
        check_same_shape("arg", arg, feat)?;
        if out.ndim() == 0 {
            return Err(Error::RankTooSmall {
                operand: "out",
                ndim: 0,
            });
        }
        check_rows("out", out, out.shape()[0], feat)?;
        check_no_alias(&[("out", Some(out))], &[("feat", Some(feat)), ("arg", Some(arg))])?;

        FloatType::from_dtype(out.dtype(), "BackwardSegmentCmp")?;
        check_dtype(out.dtype(), &[("feat", Some(feat))])?;
        let id_type = IdType::from_dtype(arg.dtype(), "BackwardSegmentCmp")?;

        let kargs = BackwardSegmentCmpArgs { feat, arg, out };
        crate::dispatch_device!(self, ctx, "BackwardSegmentCmp", K => {
            tracing::debug!(kernels = K.name(), ?id_type, dtype = %out.dtype(), "dispatch");
            crate::dispatch_id_type!(id_type, I => {
                crate::dispatch_float_type!(out.dtype(), F => {
                    K.backward_segment_cmp::<I, F>(&kargs)
                }, "BackwardSegmentCmp")
            })
        })
    }
}
