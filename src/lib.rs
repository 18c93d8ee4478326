//! # graphops
//!
//! **Validation and dispatch for generalized sparse-dense graph kernels.**
//!
//! graphops sits between graph topology and compute kernels. Each call checks
//! that the operands fit the graph, picks a sparse representation, resolves
//! the feature broadcast and hands off to exactly one kernel specialized for
//! the device, the index width and the feature width.
//!
//! ## Operations
//!
//! - **SpMM**: per-destination reduce (`sum`, `max`, `min`) of
//!   `op(source feature, edge feature)` over incoming edges
//! - **SDDMM**: per-edge `op(lhs[role], rhs[role])`, including `dot`
//! - **SegmentReduce**: reduce contiguous row segments
//! - **BackwardSegmentCmp**: scatter gradients to recorded max/min winners
//! - **Edge mapping**: CSC edge order back to edge ids
//!
//! ## Quick Start
//!
//! ```rust
//! use graphops::prelude::*;
//! use graphops::sparse::CooMatrix;
//!
//! let coo = CooMatrix::from_slices(&[0i32, 1, 2], &[1, 2, 0], 3, 3, Context::cpu())?;
//! let graph = UnitGraph::from_coo(coo);
//!
//! let h = Tensor::from_slice(&[1.0f32, 4.0, 2.0, 5.0, 3.0, 6.0], &[3, 2], Context::cpu());
//! let out = Tensor::zeros(&[3, 2], DType::F32, Context::cpu());
//! let arg_u = Tensor::zeros(&[3, 2], DType::I32, Context::cpu());
//!
//! let engine = Engine::new();
//! engine.spmm(
//!     BinaryOp::CopyLhs,
//!     ReduceOp::Max,
//!     &graph,
//!     Some(&h),
//!     None,
//!     &out,
//!     ArgOutputs::new(Some(&arg_u), None),
//! )?;
//! assert_eq!(out.to_vec::<f32>(), vec![3.0, 6.0, 1.0, 4.0, 2.0, 5.0]);
//! assert_eq!(arg_u.to_vec::<i32>(), vec![2, 2, 0, 0, 1, 1]);
//! # Ok::<(), graphops::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded CPU kernels
//! - `f16` (default): half-precision features (F16, BF16)
//! - `cuda`: route CUDA contexts to kernels installed with
//!   [`Engine::with_accelerator`](ops::Engine::with_accelerator)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod dtype;
pub mod error;
pub mod graph;
pub mod ops;
pub mod runtime;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::graph::{GraphRelation, HeteroGraph, Target, UnitGraph};
    pub use crate::ops::{ArgOutputs, BinaryOp, Engine, ReduceOp};
    pub use crate::runtime::{Context, DeviceType};
    pub use crate::tensor::Tensor;
}
