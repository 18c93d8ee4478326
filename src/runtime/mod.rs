//! Runtime backends for kernel execution
//!
//! This module defines device contexts and the `SparseKernels` contract that
//! every compute backend implements.
//!
//! # Architecture
//!
//! ```text
//! Engine (validation, format selection, broadcast)
//! ├── DeviceType::Cpu  -> CpuKernels (reference kernels, always compiled)
//! └── DeviceType::Cuda -> accelerator kernels (feature "cuda", supplied by caller)
//! ```

pub mod cpu;
pub mod kernel;

pub use cpu::CpuKernels;
pub use kernel::{
    BackwardSegmentCmpArgs, NoAccelerator, SddmmArgs, SegmentReduceArgs, SparseKernels, SpmmArgs,
};

use std::fmt;

/// Kind of compute device
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Host CPU
    Cpu,
    /// NVIDIA GPU
    Cuda,
}

impl DeviceType {
    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }
}

/// Device context: a device kind plus its ordinal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Context {
    /// Device kind
    pub device_type: DeviceType,
    /// Ordinal of the device among devices of the same kind
    pub device_id: usize,
}

impl Context {
    /// The host CPU context
    pub const fn cpu() -> Self {
        Self {
            device_type: DeviceType::Cpu,
            device_id: 0,
        }
    }

    /// A CUDA device context
    pub const fn cuda(device_id: usize) -> Self {
        Self {
            device_type: DeviceType::Cuda,
            device_id,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::cpu()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_type.name(), self.device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display_and_eq() {
        assert_eq!(Context::cpu().to_string(), "cpu:0");
        assert_eq!(Context::cuda(1).to_string(), "cuda:1");
        assert_ne!(Context::cuda(0), Context::cuda(1));
        assert_eq!(Context::default(), Context::cpu());
    }
}
