//! SpMM driver

use super::format::{ensure_supported, select_format, unsupported_format, SPMM_FORMATS};
use super::validate::{
    check_contiguous, check_ctx, check_dtype, check_no_alias, check_relation, check_row_len,
    check_same_shape, check_shape,
};
use super::{calc_bcast_off, BinaryOp, Engine, ReduceOp};
use crate::dtype::FloatType;
use crate::error::{Error, Result};
use crate::graph::{GraphRelation, Target};
use crate::runtime::{SparseKernels, SpmmArgs};
use crate::sparse::{FormatCode, SparseFormat};
use crate::tensor::Tensor;

/// Optional arg outputs of SpMM
///
/// With a max/min reduce they receive, per output element, the source vertex
/// and the edge that produced the winning value (`-1` where nothing won).
/// Both are ignored by the sum reduce.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArgOutputs<'a> {
    /// Winning source vertex, shaped like the output
    pub arg_u: Option<&'a Tensor>,
    /// Winning edge, shaped like the output
    pub arg_e: Option<&'a Tensor>,
}

impl<'a> ArgOutputs<'a> {
    /// No arg outputs
    pub const fn none() -> Self {
        Self {
            arg_u: None,
            arg_e: None,
        }
    }

    /// Both arg outputs
    pub const fn new(arg_u: Option<&'a Tensor>, arg_e: Option<&'a Tensor>) -> Self {
        Self { arg_u, arg_e }
    }
}

impl<A: SparseKernels> Engine<A> {
    /// Generalized sparse-dense matrix multiply
    ///
    /// For every destination vertex `v`, reduces `op(ufeat[u], efeat[e])`
    /// over its in-edges `(u, e)` into `out[v]`. `ufeat` is bound to source
    /// vertices, `efeat` to edges, `out` and the arg outputs to destination
    /// vertices. The outputs are written in place; nothing is allocated.
    ///
    /// # Errors
    ///
    /// Fails before any kernel runs when the graph has several edge types,
    /// an operand is on another device, strided, or has a leading dimension
    /// that disagrees with its role, when the feature shapes do not
    /// broadcast, or when a dtype or device has no kernel.
    #[allow(clippy::too_many_arguments)]
    pub fn spmm<G: GraphRelation + ?Sized>(
        &self,
        op: BinaryOp,
        reduce: ReduceOp,
        graph: &G,
        ufeat: Option<&Tensor>,
        efeat: Option<&Tensor>,
        out: &Tensor,
        args: ArgOutputs<'_>,
    ) -> Result<()> {
        let span = tracing::debug_span!("spmm", %op, %reduce, device = %graph.context());
        let _enter = span.enter();

        check_relation(graph)?;
        if op == BinaryOp::Dot {
            return Err(Error::invalid_argument("op", "dot is only supported by SDDMM"));
        }

        let ctx = graph.context();
        let operands = [
            ("ufeat", ufeat),
            ("efeat", efeat),
            ("out", Some(out)),
            ("arg_u", args.arg_u),
            ("arg_e", args.arg_e),
        ];
        check_ctx(ctx, &operands)?;
        check_contiguous(&operands)?;
        check_shape(
            graph.dims(),
            &[
                ("ufeat", Target::Src, ufeat),
                ("efeat", Target::Edge, efeat),
                ("out", Target::Dst, Some(out)),
                ("arg_u", Target::Dst, args.arg_u),
                ("arg_e", Target::Dst, args.arg_e),
            ],
        )?;
        check_no_alias(
            &[("out", Some(out)), ("arg_u", args.arg_u), ("arg_e", args.arg_e)],
            &[("ufeat", ufeat), ("efeat", efeat)],
        )?;

        FloatType::from_dtype(out.dtype(), "SpMM")?;
        check_dtype(out.dtype(), &[("ufeat", ufeat), ("efeat", efeat)])?;
        check_dtype(
            graph.id_type().dtype(),
            &[("arg_u", args.arg_u), ("arg_e", args.arg_e)],
        )?;
        for (name, arg) in [("arg_u", args.arg_u), ("arg_e", args.arg_e)] {
            if let Some(arg) = arg {
                check_same_shape(name, arg, out)?;
            }
        }

        let bcast = calc_bcast_off(op, ufeat, efeat)?;
        check_row_len("out", out, bcast.out_len)?;

        let format = select_format(graph, FormatCode::CSC)?;
        ensure_supported("SpMM", format, SPMM_FORMATS)?;

        let id_type = graph.id_type();
        let (arg_u, arg_e) = (args.arg_u, args.arg_e);
        match format {
            SparseFormat::Csc => {
                let kargs = SpmmArgs {
                    op,
                    reduce,
                    bcast: &bcast,
                    matrix: graph.csc()?,
                    ufeat,
                    efeat,
                    out,
                    arg_u,
                    arg_e,
                };
                crate::dispatch_device!(self, ctx, "SpMM", K => {
                    tracing::debug!(%format, kernels = K.name(), ?id_type, dtype = %out.dtype(), "dispatch");
                    crate::dispatch_id_type!(id_type, I => {
                        crate::dispatch_float_type!(out.dtype(), F => {
                            K.spmm_csc::<I, F>(&kargs)
                        }, "SpMM")
                    })
                })
            }
            SparseFormat::Coo => {
                let kargs = SpmmArgs {
                    op,
                    reduce,
                    bcast: &bcast,
                    matrix: graph.coo()?,
                    ufeat,
                    efeat,
                    out,
                    arg_u,
                    arg_e,
                };
                crate::dispatch_device!(self, ctx, "SpMM", K => {
                    tracing::debug!(%format, kernels = K.name(), ?id_type, dtype = %out.dtype(), "dispatch");
                    crate::dispatch_id_type!(id_type, I => {
                        crate::dispatch_float_type!(out.dtype(), F => {
                            K.spmm_coo::<I, F>(&kargs)
                        }, "SpMM")
                    })
                })
            }
            other => Err(unsupported_format("SpMM", other, SPMM_FORMATS)),
        }
    }

    /// [`spmm`](Self::spmm) with operator names, for binding layers
    #[allow(clippy::too_many_arguments)]
    pub fn spmm_str<G: GraphRelation + ?Sized>(
        &self,
        op: &str,
        reduce: &str,
        graph: &G,
        ufeat: Option<&Tensor>,
        efeat: Option<&Tensor>,
        out: &Tensor,
        args: ArgOutputs<'_>,
    ) -> Result<()> {
        self.spmm(op.parse()?, reduce.parse()?, graph, ufeat, efeat, out, args)
    }
}
