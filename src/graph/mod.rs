//! Graph relations consumed by the operation drivers
//!
//! The engine never owns topology. It talks to a [`GraphRelation`]: vertex and
//! edge counts per endpoint role, the sparse formats the relation allows and
//! has already built, and get-or-build accessors for each format.
//!
//! [`UnitGraph`] is a single relation with lazily cached formats;
//! [`HeteroGraph`] groups several relations and is rejected by every driver
//! until the caller picks one.

mod hetero;
mod unit;

pub use hetero::HeteroGraph;
pub use unit::UnitGraph;

use crate::dtype::IdType;
use crate::error::{Error, Result};
use crate::runtime::Context;
use crate::sparse::{CooMatrix, CscMatrix, CsrMatrix, FormatCode};
use std::fmt;

/// Endpoint role an operand's leading dimension is bound to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Source vertices
    Src = 0,
    /// Edges
    Edge = 1,
    /// Destination vertices
    Dst = 2,
}

impl Target {
    /// Role index (0, 1 or 2)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Src => "src",
            Self::Edge => "edge",
            Self::Dst => "dst",
        }
    }
}

impl TryFrom<i32> for Target {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Src),
            1 => Ok(Self::Edge),
            2 => Ok(Self::Dst),
            other => Err(Error::invalid_argument(
                "target",
                format!("role index must be 0, 1 or 2, got {other}"),
            )),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Graph-derived counts indexed by [`Target`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphDims {
    /// Number of source vertices
    pub src: usize,
    /// Number of edges
    pub edge: usize,
    /// Number of destination vertices
    pub dst: usize,
}

impl GraphDims {
    /// Count bound to `role`
    #[inline]
    pub const fn count(&self, role: Target) -> usize {
        match role {
            Target::Src => self.src,
            Target::Edge => self.edge,
            Target::Dst => self.dst,
        }
    }
}

/// One relation (edge type) of a graph, as seen by the drivers
///
/// Format accessors build the representation on first use and cache it;
/// implementations must make that safe under concurrent first access.
pub trait GraphRelation: Send + Sync {
    /// Number of edge types; drivers require exactly one
    fn num_edge_types(&self) -> usize;

    /// Number of source vertices
    fn num_src_vertices(&self) -> usize;

    /// Number of destination vertices
    fn num_dst_vertices(&self) -> usize;

    /// Number of edges
    fn num_edges(&self) -> usize;

    /// Device holding the topology
    fn context(&self) -> Context;

    /// Index width of the topology arrays
    fn id_type(&self) -> IdType;

    /// Formats this relation may materialize
    fn allowed_formats(&self) -> FormatCode;

    /// Formats already materialized
    fn created_formats(&self) -> FormatCode;

    /// True when the relation is too sparse for compressed formats to pay off
    fn is_hypersparse(&self) -> bool;

    /// COO view, built on first access
    fn coo(&self) -> Result<&CooMatrix>;

    /// CSR view, built on first access
    fn csr(&self) -> Result<&CsrMatrix>;

    /// CSC view, built on first access
    fn csc(&self) -> Result<&CscMatrix>;

    /// Counts for every role
    fn dims(&self) -> GraphDims {
        GraphDims {
            src: self.num_src_vertices(),
            edge: self.num_edges(),
            dst: self.num_dst_vertices(),
        }
    }
}
