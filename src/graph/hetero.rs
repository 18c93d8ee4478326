//! Multi-relation graph container

use super::{GraphRelation, UnitGraph};
use crate::dtype::IdType;
use crate::error::{Error, Result};
use crate::runtime::Context;
use crate::sparse::{CooMatrix, CscMatrix, CsrMatrix, FormatCode};

/// A graph with one [`UnitGraph`] per edge type
///
/// Its `GraphRelation` view answers for the first relation but reports the
/// real number of edge types, so drivers refuse it. Pass
/// [`HeteroGraph::relation`] to the engine instead.
#[derive(Debug)]
pub struct HeteroGraph {
    relations: Vec<UnitGraph>,
}

impl HeteroGraph {
    /// Group relations into one graph
    pub fn new(relations: Vec<UnitGraph>) -> Result<Self> {
        if relations.is_empty() {
            return Err(Error::invalid_argument("relations", "at least one relation is required"));
        }
        Ok(Self { relations })
    }

    /// Relation for edge type `etype`
    pub fn relation(&self, etype: usize) -> Option<&UnitGraph> {
        self.relations.get(etype)
    }

    /// All relations in edge-type order
    pub fn relations(&self) -> &[UnitGraph] {
        &self.relations
    }

    fn first(&self) -> &UnitGraph {
        &self.relations[0]
    }
}

impl GraphRelation for HeteroGraph {
    fn num_edge_types(&self) -> usize {
        self.relations.len()
    }

    fn num_src_vertices(&self) -> usize {
        self.first().num_src_vertices()
    }

    fn num_dst_vertices(&self) -> usize {
        self.first().num_dst_vertices()
    }

    fn num_edges(&self) -> usize {
        self.first().num_edges()
    }

    fn context(&self) -> Context {
        self.first().context()
    }

    fn id_type(&self) -> IdType {
        self.first().id_type()
    }

    fn allowed_formats(&self) -> FormatCode {
        self.first().allowed_formats()
    }

    fn created_formats(&self) -> FormatCode {
        self.first().created_formats()
    }

    fn is_hypersparse(&self) -> bool {
        self.first().is_hypersparse()
    }

    fn coo(&self) -> Result<&CooMatrix> {
        self.first().coo()
    }

    fn csr(&self) -> Result<&CsrMatrix> {
        self.first().csr()
    }

    fn csc(&self) -> Result<&CscMatrix> {
        self.first().csc()
    }
}
