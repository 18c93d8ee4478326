//! Tensor descriptors
//!
//! This module provides the `Tensor` type: a shape/stride view over shared
//! storage tagged with a dtype and a device context.

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::{Layout, Shape, Strides};
pub use storage::Storage;
