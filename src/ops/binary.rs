//! Combine and reduce operator tags
//!
//! Operator names arrive as strings at the binding boundary; they are parsed
//! once per call into these closed enums and never compared as strings inside
//! a kernel.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Elementwise combine operator applied per edge
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Sub,
    /// `lhs * rhs`
    Mul,
    /// `lhs / rhs`
    Div,
    /// `lhs`, the right operand is ignored and may be absent
    CopyLhs,
    /// `rhs`, the left operand is ignored and may be absent
    CopyRhs,
    /// Inner product over the last feature dimension (SDDMM only)
    Dot,
}

impl BinaryOp {
    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::CopyLhs => "copy_lhs",
            Self::CopyRhs => "copy_rhs",
            Self::Dot => "dot",
        }
    }

    /// True if the left operand is read
    #[inline]
    pub const fn uses_lhs(self) -> bool {
        !matches!(self, Self::CopyRhs)
    }

    /// True if the right operand is read
    #[inline]
    pub const fn uses_rhs(self) -> bool {
        !matches!(self, Self::CopyLhs)
    }

    /// True for the copy operators, which never broadcast
    #[inline]
    pub const fn is_copy(self) -> bool {
        matches!(self, Self::CopyLhs | Self::CopyRhs)
    }

    /// Apply the operator to one pair of elements
    ///
    /// `Dot` combines like `Mul`; the kernel sums the products.
    #[inline]
    pub fn combine(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul | Self::Dot => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::CopyLhs => lhs,
            Self::CopyRhs => rhs,
        }
    }
}

impl FromStr for BinaryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "mul" => Ok(Self::Mul),
            "div" => Ok(Self::Div),
            "copy_lhs" | "copy_u" => Ok(Self::CopyLhs),
            // SDDMM names its right operand after the destination vertex
            "copy_rhs" | "copy_e" | "copy_v" => Ok(Self::CopyRhs),
            "dot" => Ok(Self::Dot),
            other => Err(Error::UnknownOperator {
                kind: "binary",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reduce operator applied over a group (incoming edges or a segment)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Sum of the group
    Sum,
    /// Maximum of the group, with argmax bookkeeping
    Max,
    /// Minimum of the group, with argmin bookkeeping
    Min,
}

impl ReduceOp {
    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// True if the reduce records which element won
    #[inline]
    pub const fn needs_arg(self) -> bool {
        matches!(self, Self::Max | Self::Min)
    }

    /// Identity element as f64
    ///
    /// - sum → 0
    /// - max → -∞
    /// - min → +∞
    pub const fn identity(self) -> f64 {
        match self {
            Self::Sum => 0.0,
            Self::Max => f64::NEG_INFINITY,
            Self::Min => f64::INFINITY,
        }
    }

    /// True if `val` strictly beats `acc`
    ///
    /// Strict comparison keeps the first winner on ties.
    #[inline]
    pub fn improves(self, acc: f64, val: f64) -> bool {
        match self {
            Self::Sum => false,
            Self::Max => val > acc,
            Self::Min => val < acc,
        }
    }
}

impl FromStr for ReduceOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(Error::UnknownOperator {
                kind: "reduce",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
