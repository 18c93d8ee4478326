//! CPU backend
//!
//! `CpuKernels` is the reference implementation of every kernel entry point
//! and is always compiled. Parallel loops are split into tasks of at least
//! `min_rows` output rows.

pub(crate) mod kernels;

use super::kernel::{
    BackwardSegmentCmpArgs, SddmmArgs, SegmentReduceArgs, SparseKernels, SpmmArgs,
};
use crate::dtype::{FloatElement, IndexElement};
use crate::error::Result;
use crate::sparse::{CooMatrix, CscMatrix, CsrMatrix};

/// CPU kernel set
#[derive(Clone, Debug)]
pub struct CpuKernels {
    min_rows: usize,
}

impl CpuKernels {
    /// Create a kernel set splitting work into tasks of at least `min_rows` rows
    pub fn new(min_rows: usize) -> Self {
        Self {
            min_rows: min_rows.max(1),
        }
    }

    /// Minimum rows per parallel task
    pub fn min_rows(&self) -> usize {
        self.min_rows
    }
}

impl Default for CpuKernels {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SparseKernels for CpuKernels {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn spmm_csc<I: IndexElement, F: FloatElement>(
        &self,
        args: &SpmmArgs<'_, CscMatrix>,
    ) -> Result<()> {
        kernels::spmm::spmm_csc::<I, F>(args, self.min_rows)
    }

    fn spmm_coo<I: IndexElement, F: FloatElement>(
        &self,
        args: &SpmmArgs<'_, CooMatrix>,
    ) -> Result<()> {
        kernels::spmm::spmm_coo::<I, F>(args)
    }

    fn sddmm_csr<I: IndexElement, F: FloatElement>(
        &self,
        args: &SddmmArgs<'_, CsrMatrix>,
    ) -> Result<()> {
        kernels::sddmm::sddmm_csr::<I, F>(args, self.min_rows)
    }

    fn sddmm_coo<I: IndexElement, F: FloatElement>(
        &self,
        args: &SddmmArgs<'_, CooMatrix>,
    ) -> Result<()> {
        kernels::sddmm::sddmm_coo::<I, F>(args, self.min_rows)
    }

    fn segment_reduce<I: IndexElement, F: FloatElement>(
        &self,
        args: &SegmentReduceArgs<'_>,
    ) -> Result<()> {
        kernels::segment::segment_reduce::<I, F>(args, self.min_rows)
    }

    fn backward_segment_cmp<I: IndexElement, F: FloatElement>(
        &self,
        args: &BackwardSegmentCmpArgs<'_>,
    ) -> Result<()> {
        kernels::segment::backward_segment_cmp::<I, F>(args)
    }
}
