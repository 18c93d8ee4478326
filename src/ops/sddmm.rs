//! SDDMM driver

use super::format::{ensure_supported, select_format, unsupported_format, SDDMM_FORMATS};
use super::validate::{
    check_contiguous, check_ctx, check_dtype, check_no_alias, check_relation, check_row_len,
    check_shape,
};
use super::{calc_bcast_off, BinaryOp, Engine};
use crate::dtype::FloatType;
use crate::error::Result;
use crate::graph::{GraphRelation, Target};
use crate::runtime::{SddmmArgs, SparseKernels};
use crate::sparse::{FormatCode, SparseFormat};
use crate::tensor::Tensor;

impl<A: SparseKernels> Engine<A> {
    /// Generalized sampled dense-dense matrix multiply
    ///
    /// For every edge `e = (u, v)`, writes `op(lhs[t_l(e)], rhs[t_r(e)])` to
    /// `out[e]`, where each target picks the source vertex, the edge itself or
    /// the destination vertex. `dot` reduces the shared last feature
    /// dimension.
    ///
    /// ```
    /// use graphops::prelude::*;
    /// use graphops::sparse::CooMatrix;
    ///
    /// let coo = CooMatrix::from_slices(&[0i32, 1], &[1, 0], 2, 2, Context::cpu())?;
    /// let graph = UnitGraph::from_coo(coo);
    /// let x = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], Context::cpu());
    /// let out = Tensor::zeros(&[2, 1], DType::F64, Context::cpu());
    ///
    /// Engine::new().sddmm(BinaryOp::Dot, &graph, Some(&x), Some(&x), &out, Target::Src, Target::Dst)?;
    /// assert_eq!(out.to_vec::<f64>(), vec![11.0, 11.0]);
    /// # Ok::<(), graphops::error::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same preconditions as [`spmm`](Self::spmm), with `lhs` and `rhs` bound
    /// to their targets and `out` bound to edges.
    #[allow(clippy::too_many_arguments)]
    pub fn sddmm<G: GraphRelation + ?Sized>(
        &self,
        op: BinaryOp,
        graph: &G,
        lhs: Option<&Tensor>,
        rhs: Option<&Tensor>,
        out: &Tensor,
        lhs_target: Target,
        rhs_target: Target,
    ) -> Result<()> {
        let span = tracing::debug_span!("sddmm", %op, %lhs_target, %rhs_target, device = %graph.context());
        let _enter = span.enter();

        check_relation(graph)?;
        let ctx = graph.context();
        let operands = [("lhs", lhs), ("rhs", rhs), ("out", Some(out))];
        check_ctx(ctx, &operands)?;
        check_contiguous(&operands)?;
        check_shape(
            graph.dims(),
            &[
                ("lhs", lhs_target, lhs),
                ("rhs", rhs_target, rhs),
                ("out", Target::Edge, Some(out)),
            ],
        )?;
        check_no_alias(&[("out", Some(out))], &[("lhs", lhs), ("rhs", rhs)])?;

        FloatType::from_dtype(out.dtype(), "SDDMM")?;
        check_dtype(out.dtype(), &[("lhs", lhs), ("rhs", rhs)])?;

        let bcast = calc_bcast_off(op, lhs, rhs)?;
        check_row_len("out", out, bcast.out_len)?;

        let format = select_format(graph, FormatCode::COO)?;
        ensure_supported("SDDMM", format, SDDMM_FORMATS)?;

        let id_type = graph.id_type();
        match format {
            SparseFormat::Csr => {
                let kargs = SddmmArgs {
                    op,
                    bcast: &bcast,
                    matrix: graph.csr()?,
                    lhs,
                    rhs,
                    out,
                    lhs_target,
                    rhs_target,
                };
                crate::dispatch_device!(self, ctx, "SDDMM", K => {
                    tracing::debug!(%format, kernels = K.name(), ?id_type, dtype = %out.dtype(), "dispatch");
                    crate::dispatch_id_type!(id_type, I => {
                        crate::dispatch_float_type!(out.dtype(), F => {
                            K.sddmm_csr::<I, F>(&kargs)
                        }, "SDDMM")
                    })
                })
            }
            SparseFormat::Coo => {
                let kargs = SddmmArgs {
                    op,
                    bcast: &bcast,
                    matrix: graph.coo()?,
                    lhs,
                    rhs,
                    out,
                    lhs_target,
                    rhs_target,
                };
                crate::dispatch_device!(self, ctx, "SDDMM", K => {
                    tracing::debug!(%format, kernels = K.name(), ?id_type, dtype = %out.dtype(), "dispatch");
                    crate::dispatch_id_type!(id_type, I => {
                        crate::dispatch_float_type!(out.dtype(), F => {
                            K.sddmm_coo::<I, F>(&kargs)
                        }, "SDDMM")
                    })
                })
            }
            other => Err(unsupported_format("SDDMM", other, SDDMM_FORMATS)),
        }
    }

    /// [`sddmm`](Self::sddmm) with an operator name and integer role
    /// indices (0 = src, 1 = edge, 2 = dst), for binding layers
    #[allow(clippy::too_many_arguments)]
    pub fn sddmm_str<G: GraphRelation + ?Sized>(
        &self,
        op: &str,
        graph: &G,
        lhs: Option<&Tensor>,
        rhs: Option<&Tensor>,
        out: &Tensor,
        lhs_target: i32,
        rhs_target: i32,
    ) -> Result<()> {
        self.sddmm(
            op.parse()?,
            graph,
            lhs,
            rhs,
            out,
            Target::try_from(lhs_target)?,
            Target::try_from(rhs_target)?,
        )
    }
}
