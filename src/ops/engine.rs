//! The dispatch engine
//!
//! An `Engine` owns the configuration, the CPU kernel set, an optional
//! accelerator kernel set and an optional accelerated module. It holds no
//! per-call state: every driver call validates, selects a format, resolves
//! the broadcast and dispatches exactly one kernel.

use super::accel::AcceleratedModule;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::runtime::cpu::CpuKernels;
use crate::runtime::{Context, NoAccelerator, SparseKernels};
use std::fmt;
use std::sync::Arc;

/// Validation and dispatch front end for the graph kernels
///
/// `A` is the accelerator kernel set serving `DeviceType::Cuda` contexts.
/// It is only consulted when the crate is built with the `cuda` feature.
///
/// ```
/// use graphops::prelude::*;
/// use graphops::sparse::CooMatrix;
///
/// // 0 -> 1, 0 -> 2, 1 -> 2
/// let coo = CooMatrix::from_slices(&[0i64, 0, 1], &[1, 2, 2], 3, 3, Context::cpu())?;
/// let graph = UnitGraph::from_coo(coo);
///
/// let ufeat = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1], Context::cpu());
/// let out = Tensor::zeros(&[3, 1], DType::F32, Context::cpu());
///
/// let engine = Engine::new();
/// engine.spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&ufeat), None, &out, ArgOutputs::none())?;
/// assert_eq!(out.to_vec::<f32>(), vec![0.0, 1.0, 3.0]);
/// # Ok::<(), graphops::error::Error>(())
/// ```
pub struct Engine<A = NoAccelerator> {
    config: EngineConfig,
    cpu: CpuKernels,
    accelerator: Option<A>,
    module: Option<Arc<dyn AcceleratedModule>>,
}

impl Engine<NoAccelerator> {
    /// Engine with default configuration and CPU kernels only
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with an explicit configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            cpu: CpuKernels::new(config.parallel_min_rows),
            config,
            accelerator: None,
            module: None,
        }
    }

    /// Engine configured from `GRAPHOPS_*` environment variables
    pub fn from_env() -> Self {
        Self::with_config(EngineConfig::from_env())
    }
}

impl Default for Engine<NoAccelerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: SparseKernels> Engine<A> {
    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install the kernel set serving accelerator contexts
    pub fn with_accelerator<B: SparseKernels>(self, kernels: B) -> Engine<B> {
        Engine {
            config: self.config,
            cpu: self.cpu,
            accelerator: Some(kernels),
            module: self.module,
        }
    }

    /// Register the accelerated module used by `load_module` and the
    /// tree-reduction SDDMM
    pub fn with_accelerated_module(mut self, module: Arc<dyn AcceleratedModule>) -> Self {
        self.module = Some(module);
        self
    }

    /// Registered accelerated module, if any
    pub fn accelerated_module(&self) -> Option<&Arc<dyn AcceleratedModule>> {
        self.module.as_ref()
    }

    /// CPU kernel set
    #[inline]
    pub fn cpu_kernels(&self) -> &CpuKernels {
        &self.cpu
    }

    /// Kernel set for an accelerator context
    ///
    /// Fails with `UnsupportedDevice` unless the `cuda` feature is enabled
    /// and an accelerator was installed.
    pub fn accelerator_kernels(&self, ctx: Context, op: &'static str) -> Result<&A> {
        #[cfg(feature = "cuda")]
        if let Some(kernels) = &self.accelerator {
            return Ok(kernels);
        }
        tracing::debug!(device = %ctx, op, "no kernels for device");
        Err(Error::UnsupportedDevice { device: ctx, op })
    }
}

impl<A: SparseKernels> fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("cpu", &self.cpu)
            .field("accelerator", &self.accelerator.as_ref().map(|a| a.name()))
            .field("module", &self.module.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}
