//! Graph operations
//!
//! The [`Engine`] drivers validate operands, select a sparse format, resolve
//! the broadcast and dispatch one kernel per call.
//!
//! ```text
//! Engine::spmm / sddmm / segment_reduce / backward_segment_cmp
//!   ├── validate   (relation, context, contiguity, shapes, dtypes, aliasing)
//!   ├── broadcast  (BcastOff from feature shapes)
//!   ├── format     (preferred format, fall back to what exists)
//!   └── dispatch   (device → IdType → FloatType → SparseKernels method)
//! ```
//!
//! | Operation | Preferred | Supported |
//! |-----------|-----------|-----------|
//! | SpMM | CSC | CSC, COO |
//! | SDDMM | COO | CSR, COO |
//! | Tree-reduction SDDMM | COO | COO |

mod accel;
mod binary;
mod broadcast;
pub mod dispatch;
mod edge_mapping;
mod engine;
pub mod format;
mod sddmm;
mod segment;
mod spmm;
pub mod validate;

pub use accel::AcceleratedModule;
pub use binary::{BinaryOp, ReduceOp};
pub use broadcast::{calc_bcast_off, BcastOff};
pub use engine::Engine;
pub use spmm::ArgOutputs;

pub use crate::graph::Target;
