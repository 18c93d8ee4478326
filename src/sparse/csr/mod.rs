//! CSR (Compressed Sparse Row) sparse format

mod conversion;
mod core;

pub use core::CsrMatrix;
