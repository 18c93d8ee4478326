//! Optional accelerated module
//!
//! An externally compiled kernel module can be registered on an [`Engine`].
//! It serves `load_module` and an alternate tree-reduction SDDMM. Without a
//! registered module, or with `tree_reduction` disabled, the tree-reduction
//! entry point runs the default SDDMM dispatch.

use super::format::{ensure_supported, select_format, TREE_REDUCTION_FORMATS};
use super::validate::{
    check_contiguous, check_ctx, check_dtype, check_no_alias, check_relation, check_row_len,
    check_shape,
};
use super::{calc_bcast_off, BinaryOp, Engine};
use crate::dtype::FloatType;
use crate::error::{Error, Result};
use crate::graph::{GraphRelation, Target};
use crate::runtime::SparseKernels;
use crate::sparse::{CooMatrix, FormatCode};
use crate::tensor::Tensor;
use std::fmt;
use std::path::Path;

/// An externally compiled kernel module
///
/// Implementations receive operands that already passed the engine's
/// validation and write `out` in place.
pub trait AcceleratedModule: Send + Sync + fmt::Debug {
    /// Module name used in log records
    fn name(&self) -> &str;

    /// Load compiled kernels from `path`
    fn load(&self, path: &Path) -> Result<()>;

    /// Dot-product SDDMM from source rows of `lhs` and destination rows of
    /// `rhs` into one `out` row per edge
    fn sddmm_tree_reduction(&self, coo: &CooMatrix, lhs: &Tensor, rhs: &Tensor, out: &Tensor) -> Result<()>;
}

impl<A: SparseKernels> Engine<A> {
    /// Load compiled kernels into the registered accelerated module
    ///
    /// # Errors
    ///
    /// `ModuleUnavailable` when no module is registered; otherwise whatever
    /// the module reports.
    pub fn load_module(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let module = self
            .accelerated_module()
            .ok_or(Error::ModuleUnavailable { op: "load_module" })?;
        tracing::info!(module = module.name(), path = %path.display(), "loading accelerated module");
        module.load(path)
    }

    /// Dot-product SDDMM between source and destination features
    ///
    /// Computes `out[e] = dot(lhs[src(e)], rhs[dst(e)])`. With
    /// `tree_reduction` enabled and a registered module it runs on the module
    /// over COO; otherwise it is exactly
    /// `sddmm(Dot, graph, lhs, rhs, out, Src, Dst)`.
    pub fn sddmm_tree_reduction<G: GraphRelation + ?Sized>(
        &self,
        graph: &G,
        lhs: &Tensor,
        rhs: &Tensor,
        out: &Tensor,
    ) -> Result<()> {
        let span = tracing::debug_span!("sddmm_tree_reduction", device = %graph.context());
        let _enter = span.enter();

        check_relation(graph)?;
        let ctx = graph.context();
        let operands = [("lhs", Some(lhs)), ("rhs", Some(rhs)), ("out", Some(out))];
        check_ctx(ctx, &operands)?;
        check_contiguous(&operands)?;

        let module = match self.accelerated_module() {
            Some(module) if self.config().tree_reduction => module,
            _ => {
                tracing::debug!("tree reduction unavailable, using default dispatch");
                return self.sddmm(BinaryOp::Dot, graph, Some(lhs), Some(rhs), out, Target::Src, Target::Dst);
            }
        };

        if self.config().validate_tree_reduction_shapes {
            check_shape(
                graph.dims(),
                &[
                    ("lhs", Target::Src, Some(lhs)),
                    ("rhs", Target::Dst, Some(rhs)),
                    ("out", Target::Edge, Some(out)),
                ],
            )?;
        }
        check_no_alias(&[("out", Some(out))], &[("lhs", Some(lhs)), ("rhs", Some(rhs))])?;
        FloatType::from_dtype(out.dtype(), "SDDMM")?;
        check_dtype(out.dtype(), &[("lhs", Some(lhs)), ("rhs", Some(rhs))])?;
        let bcast = calc_bcast_off(BinaryOp::Dot, Some(lhs), Some(rhs))?;
        check_row_len("out", out, bcast.out_len)?;

        let format = select_format(graph, FormatCode::COO)?;
        ensure_supported("SDDMM", format, TREE_REDUCTION_FORMATS)?;

        tracing::debug!(module = module.name(), %format, dtype = %out.dtype(), "dispatch");
        module.sddmm_tree_reduction(graph.coo()?, lhs, rhs, out)
    }
}
