//! CSC (Compressed Sparse Column) sparse format

mod conversion;
mod core;

pub use core::CscMatrix;
