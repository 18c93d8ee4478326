//! Compile-time specialized kernel contract
//!
//! `SparseKernels` is implemented once per device backend. Its methods are
//! generic over the index width `I` and the feature width `F`, so the engine's
//! dispatch macros resolve a `(device, IdType, FloatType)` triple to exactly one
//! monomorphized entry point with a constant number of `match` arms.
//!
//! ```text
//! dispatch_device!(ctx, K => {
//!     dispatch_id_type!(graph.id_type(), I => {
//!         dispatch_float_type!(out.dtype(), F => {
//!             K.spmm_csc::<I, F>(&args)     // one instance per triple
//!         })
//!     })
//! })
//! ```
//!
//! Kernels read the graph topology and operand tensors and write into the
//! preallocated outputs. They never allocate outputs and may assume the engine
//! already validated contexts, contiguity, shapes, dtypes and aliasing.

use crate::dtype::{FloatElement, IndexElement};
use crate::error::{Error, Result};
use crate::ops::{BcastOff, BinaryOp, ReduceOp, Target};
use crate::runtime::Context;
use crate::sparse::{CooMatrix, CscMatrix, CsrMatrix};
use crate::tensor::Tensor;

/// Operands of one SpMM call
#[derive(Debug)]
pub struct SpmmArgs<'a, M> {
    /// Elementwise combine operator
    pub op: BinaryOp,
    /// Reduce operator over incoming edges
    pub reduce: ReduceOp,
    /// Broadcast alignment between `ufeat` and `efeat`
    pub bcast: &'a BcastOff,
    /// Sparse structure (CSC or COO)
    pub matrix: &'a M,
    /// Source-vertex features, absent for `copy_rhs`
    pub ufeat: Option<&'a Tensor>,
    /// Edge features, absent for `copy_lhs`
    pub efeat: Option<&'a Tensor>,
    /// Destination-vertex output
    pub out: &'a Tensor,
    /// Winning source id per output element (max/min only)
    pub arg_u: Option<&'a Tensor>,
    /// Winning edge id per output element (max/min only)
    pub arg_e: Option<&'a Tensor>,
}

/// Operands of one SDDMM call
#[derive(Debug)]
pub struct SddmmArgs<'a, M> {
    /// Elementwise combine operator
    pub op: BinaryOp,
    /// Broadcast alignment between `lhs` and `rhs`
    pub bcast: &'a BcastOff,
    /// Sparse structure (CSR or COO)
    pub matrix: &'a M,
    /// Left operand, absent for `copy_rhs`
    pub lhs: Option<&'a Tensor>,
    /// Right operand, absent for `copy_lhs`
    pub rhs: Option<&'a Tensor>,
    /// Per-edge output
    pub out: &'a Tensor,
    /// Role indexing `lhs`
    pub lhs_target: Target,
    /// Role indexing `rhs`
    pub rhs_target: Target,
}

/// Operands of one segment reduce call
#[derive(Clone, Copy, Debug)]
pub struct SegmentReduceArgs<'a> {
    /// Reduce operator
    pub op: ReduceOp,
    /// Rows to reduce
    pub feat: &'a Tensor,
    /// Segment boundaries, `n + 1` entries
    pub offsets: &'a Tensor,
    /// One row per segment
    pub out: &'a Tensor,
    /// Winning row index per output element (max/min only)
    pub arg: Option<&'a Tensor>,
}

/// Operands of one backward segment compare call
#[derive(Clone, Copy, Debug)]
pub struct BackwardSegmentCmpArgs<'a> {
    /// Upstream gradient, one row per segment
    pub feat: &'a Tensor,
    /// Winning row index recorded by the forward pass
    pub arg: &'a Tensor,
    /// Gradient w.r.t. the forward input rows
    pub out: &'a Tensor,
}

/// Kernel entry points for one device backend.
///
/// Each method is one (operation, format) cell of the dispatch matrix; the
/// type parameters are the remaining two axes.
pub trait SparseKernels: Send + Sync {
    /// Backend name used in log records
    fn name(&self) -> &'static str;

    /// SpMM over the in-edge (CSC) structure
    fn spmm_csc<I: IndexElement, F: FloatElement>(
        &self,
        args: &SpmmArgs<'_, CscMatrix>,
    ) -> Result<()>;

    /// SpMM over the coordinate (COO) structure
    fn spmm_coo<I: IndexElement, F: FloatElement>(
        &self,
        args: &SpmmArgs<'_, CooMatrix>,
    ) -> Result<()>;

    /// SDDMM over the out-edge (CSR) structure
    fn sddmm_csr<I: IndexElement, F: FloatElement>(
        &self,
        args: &SddmmArgs<'_, CsrMatrix>,
    ) -> Result<()>;

    /// SDDMM over the coordinate (COO) structure
    fn sddmm_coo<I: IndexElement, F: FloatElement>(
        &self,
        args: &SddmmArgs<'_, CooMatrix>,
    ) -> Result<()>;

    /// Reduce contiguous row ranges
    fn segment_reduce<I: IndexElement, F: FloatElement>(
        &self,
        args: &SegmentReduceArgs<'_>,
    ) -> Result<()>;

    /// Scatter upstream gradient rows to the recorded arg rows
    fn backward_segment_cmp<I: IndexElement, F: FloatElement>(
        &self,
        args: &BackwardSegmentCmpArgs<'_>,
    ) -> Result<()>;
}

/// Placeholder accelerator for engines built without accelerator kernels.
///
/// Every entry point fails with `UnsupportedDevice`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAccelerator;

impl NoAccelerator {
    fn unsupported(op: &'static str) -> Error {
        Error::UnsupportedDevice {
            device: Context::cuda(0),
            op,
        }
    }
}

impl SparseKernels for NoAccelerator {
    fn name(&self) -> &'static str {
        "none"
    }

    fn spmm_csc<I: IndexElement, F: FloatElement>(&self, _: &SpmmArgs<'_, CscMatrix>) -> Result<()> {
        Err(Self::unsupported("SpMM"))
    }

    fn spmm_coo<I: IndexElement, F: FloatElement>(&self, _: &SpmmArgs<'_, CooMatrix>) -> Result<()> {
        Err(Self::unsupported("SpMM"))
    }

    fn sddmm_csr<I: IndexElement, F: FloatElement>(
        &self,
        _: &SddmmArgs<'_, CsrMatrix>,
    ) -> Result<()> {
        Err(Self::unsupported("SDDMM"))
    }

    fn sddmm_coo<I: IndexElement, F: FloatElement>(
        &self,
        _: &SddmmArgs<'_, CooMatrix>,
    ) -> Result<()> {
        Err(Self::unsupported("SDDMM"))
    }

    fn segment_reduce<I: IndexElement, F: FloatElement>(
        &self,
        _: &SegmentReduceArgs<'_>,
    ) -> Result<()> {
        Err(Self::unsupported("SegmentReduce"))
    }

    fn backward_segment_cmp<I: IndexElement, F: FloatElement>(
        &self,
        _: &BackwardSegmentCmpArgs<'_>,
    ) -> Result<()> {
        Err(Self::unsupported("BackwardSegmentCmp"))
    }
}
