//! Edge order of the format SpMM runs on

use super::validate::check_relation;
use super::Engine;
use crate::error::Result;
use crate::graph::GraphRelation;
use crate::runtime::SparseKernels;
use crate::sparse::{FormatCode, SparseFormat};
use crate::tensor::Tensor;

impl<A: SparseKernels> Engine<A> {
    /// Permutation from CSC edge positions to edge ids
    ///
    /// Returns the CSC edge-id array when the selector picks CSC for the
    /// relation, which builds it if needed. `None` means edges are already
    /// in id order for the format that will be used.
    ///
    /// ```
    /// use graphops::prelude::*;
    /// use graphops::sparse::CooMatrix;
    ///
    /// let coo = CooMatrix::from_slices(&[0i32, 1, 0], &[1, 0, 0], 2, 2, Context::cpu())?;
    /// let graph = UnitGraph::from_coo(coo);
    /// let mapping = Engine::new().edge_mapping(&graph)?.expect("csc selected");
    /// assert_eq!(mapping.to_vec::<i32>(), vec![1, 2, 0]);
    /// # Ok::<(), graphops::error::Error>(())
    /// ```
    pub fn edge_mapping<'g, G: GraphRelation + ?Sized>(&self, graph: &'g G) -> Result<Option<&'g Tensor>> {
        check_relation(graph)?;
        let format = super::format::select_format(graph, FormatCode::CSC)?;
        let mapping = match format {
            SparseFormat::Csc => graph.csc()?.edge_ids(),
            SparseFormat::Coo | SparseFormat::Csr => None,
        };
        tracing::debug!(%format, identity = mapping.is_none(), "edge mapping");
        Ok(mapping)
    }
}
