//! Error types for graphops
//!
//! Every failure in this crate is a violated precondition. Errors are returned
//! before any kernel runs and are never retried or coerced away.

use crate::dtype::DType;
use crate::runtime::Context;
use crate::sparse::SparseFormat;
use thiserror::Error;

/// Result type alias using graphops' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating or dispatching an operation
#[derive(Error, Debug)]
pub enum Error {
    /// An operand lives on a different device context than the reference one
    #[error("Expected device context {expected}, but got {got} for {operand}")]
    ContextMismatch {
        /// Reference context (graph or first feature tensor)
        expected: Context,
        /// Context of the offending operand
        got: Context,
        /// Operand name
        operand: &'static str,
    },

    /// Operand is not memory-contiguous
    #[error("Expected {operand} to be a contiguous tensor")]
    NotContiguous {
        /// Operand name
        operand: &'static str,
    },

    /// Operand rank is below 2
    #[error(
        "Expected {operand} to have ndim >= 2, got {ndim}; scalar features need \
         an explicit trailing dimension of length one"
    )]
    RankTooSmall {
        /// Operand name
        operand: &'static str,
        /// Actual rank
        ndim: usize,
    },

    /// Leading dimension disagrees with the graph-derived count for its role
    #[error("Expected {operand} to have size {expected} on the first dimension, but got {got}")]
    LeadingDimMismatch {
        /// Operand name
        operand: &'static str,
        /// Count the graph prescribes for this operand's role
        expected: usize,
        /// Actual leading dimension
        got: usize,
    },

    /// Shape mismatch outside the leading dimension
    #[error("Shape mismatch for {operand}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Operand name
        operand: &'static str,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Feature shapes cannot be broadcast together
    #[error("Cannot broadcast {op} operands with shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Operator being resolved
        op: &'static str,
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Selected sparse format has no kernel for this operation
    #[error("{op} only supports {supported} formats, got {format}")]
    UnsupportedFormat {
        /// Operation name
        op: &'static str,
        /// Selected format
        format: SparseFormat,
        /// Human-readable list of supported formats
        supported: String,
    },

    /// Sparse format is not allowed on this graph relation
    #[error("Format {format} is not allowed on this graph relation")]
    FormatNotAllowed {
        /// Requested format
        format: SparseFormat,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Dtype needs a cargo feature that is not enabled
    #[error("DType {dtype:?} requires the '{feature}' feature")]
    FeatureRequired {
        /// The dtype
        dtype: DType,
        /// The missing feature
        feature: &'static str,
    },

    /// Device has no compiled kernel path
    #[error("Unsupported device {device} for operation '{op}'")]
    UnsupportedDevice {
        /// The device context
        device: Context,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch for {operand}: expected {expected:?}, got {got:?}")]
    DTypeMismatch {
        /// Operand name
        operand: &'static str,
        /// Expected dtype
        expected: DType,
        /// Actual dtype
        got: DType,
    },

    /// Graph carries more than one edge type
    #[error("Expected a graph with exactly one edge type, got {num_edge_types}")]
    MultiRelation {
        /// Number of edge types on the graph
        num_edge_types: usize,
    },

    /// Operator name outside the closed set
    #[error("Unknown {kind} operator '{name}'")]
    UnknownOperator {
        /// "binary" or "reduce"
        kind: &'static str,
        /// The unrecognized name
        name: String,
    },

    /// Output tensor shares storage with another operand
    #[error("Output {output} shares storage with {other}")]
    AliasedOutput {
        /// Output operand name
        output: &'static str,
        /// Operand it aliases
        other: &'static str,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// No accelerated module is registered on the engine
    #[error("No accelerated module registered for '{op}'")]
    ModuleUnavailable {
        /// The operation name
        op: &'static str,
    },

    /// Error reported by an external kernel or accelerated module
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create a dtype mismatch error
    pub fn dtype_mismatch(operand: &'static str, expected: DType, got: DType) -> Self {
        Self::DTypeMismatch {
            operand,
            expected,
            got,
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(operand: &'static str, expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            operand,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
