//! Single-relation graph with lazily materialized formats

use super::GraphRelation;
use crate::dtype::IdType;
use crate::error::{Error, Result};
use crate::runtime::Context;
use crate::sparse::{CooMatrix, CscMatrix, CsrMatrix, FormatCode, SparseFormat};
use once_cell::sync::OnceCell;
use std::borrow::Cow;

/// Relations with more source vertices than this may count as hypersparse
const HYPERSPARSE_MIN_VERTICES: usize = 1_000_000;

/// Hypersparse relations have fewer than one edge per this many sources
const HYPERSPARSE_RATIO: usize = 8;

/// One relation whose sparse formats are built on demand and cached
///
/// At least one format is always materialized. Accessing a format outside the
/// allowed set fails with `FormatNotAllowed`.
///
/// ```
/// use graphops::prelude::*;
/// use graphops::sparse::{CooMatrix, FormatCode, SparseFormat};
///
/// let coo = CooMatrix::from_slices(&[0i32, 1], &[1, 1], 2, 2, Context::cpu())?;
/// let g = UnitGraph::from_coo(coo);
/// assert_eq!(g.created_formats(), FormatCode::COO);
/// g.csc()?;
/// assert!(g.created_formats().contains(SparseFormat::Csc));
/// # Ok::<(), graphops::error::Error>(())
/// ```
#[derive(Debug)]
pub struct UnitGraph {
    num_src: usize,
    num_dst: usize,
    num_edges: usize,
    id_type: IdType,
    context: Context,
    allowed: FormatCode,
    coo: OnceCell<CooMatrix>,
    csr: OnceCell<CsrMatrix>,
    csc: OnceCell<CscMatrix>,
}

impl UnitGraph {
    fn empty_cache(
        num_src: usize,
        num_dst: usize,
        num_edges: usize,
        id_type: IdType,
        context: Context,
    ) -> Self {
        Self {
            num_src,
            num_dst,
            num_edges,
            id_type,
            context,
            allowed: FormatCode::ALL,
            coo: OnceCell::new(),
            csr: OnceCell::new(),
            csc: OnceCell::new(),
        }
    }

    /// Build a relation from its COO form
    pub fn from_coo(coo: CooMatrix) -> Self {
        let g = Self::empty_cache(
            coo.num_rows(),
            coo.num_cols(),
            coo.nnz(),
            coo.id_type(),
            coo.context(),
        );
        let _ = g.coo.set(coo);
        g
    }

    /// Build a relation from its CSR (out-edge) form
    pub fn from_csr(csr: CsrMatrix) -> Self {
        let g = Self::empty_cache(
            csr.num_rows(),
            csr.num_cols(),
            csr.nnz(),
            csr.id_type(),
            csr.context(),
        );
        let _ = g.csr.set(csr);
        g
    }

    /// Build a relation from its CSC (in-edge) form
    pub fn from_csc(csc: CscMatrix) -> Self {
        let g = Self::empty_cache(
            csc.num_rows(),
            csc.num_cols(),
            csc.nnz(),
            csc.id_type(),
            csc.context(),
        );
        let _ = g.csc.set(csc);
        g
    }

    /// Restrict the relation to `allowed` formats
    ///
    /// If no allowed format exists yet, the highest-priority allowed one is
    /// built first. Cached formats outside the mask are dropped.
    pub fn with_formats(mut self, allowed: FormatCode) -> Result<Self> {
        let target = allowed
            .decode()
            .ok_or_else(|| Error::invalid_argument("allowed", "format set is empty"))?;
        if (self.created_formats() & allowed).is_empty() {
            self.materialize(target)?;
        }
        if !allowed.contains(SparseFormat::Coo) {
            self.coo.take();
        }
        if !allowed.contains(SparseFormat::Csr) {
            self.csr.take();
        }
        if !allowed.contains(SparseFormat::Csc) {
            self.csc.take();
        }
        self.allowed = allowed;
        Ok(self)
    }

    fn materialize(&self, format: SparseFormat) -> Result<()> {
        match format {
            SparseFormat::Coo => self.coo().map(|_| ()),
            SparseFormat::Csr => self.csr().map(|_| ()),
            SparseFormat::Csc => self.csc().map(|_| ()),
        }
    }

    fn ensure_allowed(&self, format: SparseFormat) -> Result<()> {
        if self.allowed.contains(format) {
            Ok(())
        } else {
            Err(Error::FormatNotAllowed { format })
        }
    }

    /// COO form to convert from: the cached one, or a transient conversion
    /// when COO itself is not cached
    fn source_coo(&self) -> Result<Cow<'_, CooMatrix>> {
        if let Some(coo) = self.coo.get() {
            return Ok(Cow::Borrowed(coo));
        }
        if self.allowed.contains(SparseFormat::Coo) {
            return self.coo().map(Cow::Borrowed);
        }
        let coo = match (self.csr.get(), self.csc.get()) {
            (Some(csr), _) => csr.to_coo()?,
            (None, Some(csc)) => csc.to_coo()?,
            (None, None) => return Err(Error::Backend("relation has no materialized format".into())),
        };
        Ok(Cow::Owned(coo))
    }
}

impl GraphRelation for UnitGraph {
    fn num_edge_types(&self) -> usize {
        1
    }

    fn num_src_vertices(&self) -> usize {
        self.num_src
    }

    fn num_dst_vertices(&self) -> usize {
        self.num_dst
    }

    fn num_edges(&self) -> usize {
        self.num_edges
    }

    fn context(&self) -> Context {
        self.context
    }

    fn id_type(&self) -> IdType {
        self.id_type
    }

    fn allowed_formats(&self) -> FormatCode {
        self.allowed
    }

    fn created_formats(&self) -> FormatCode {
        let mut code = FormatCode::NONE;
        if self.coo.get().is_some() {
            code = code | FormatCode::COO;
        }
        if self.csr.get().is_some() {
            code = code | FormatCode::CSR;
        }
        if self.csc.get().is_some() {
            code = code | FormatCode::CSC;
        }
        code
    }

    fn is_hypersparse(&self) -> bool {
        self.num_src > HYPERSPARSE_MIN_VERTICES && self.num_edges < self.num_src / HYPERSPARSE_RATIO
    }

    fn coo(&self) -> Result<&CooMatrix> {
        self.ensure_allowed(SparseFormat::Coo)?;
        self.coo.get_or_try_init(|| {
            tracing::debug!(from = %self.created_formats(), "materializing COO");
            match (self.csr.get(), self.csc.get()) {
                (Some(csr), _) => csr.to_coo(),
                (None, Some(csc)) => csc.to_coo(),
                (None, None) => Err(Error::Backend("relation has no materialized format".into())),
            }
        })
    }

    fn csr(&self) -> Result<&CsrMatrix> {
        self.ensure_allowed(SparseFormat::Csr)?;
        self.csr.get_or_try_init(|| {
            tracing::debug!(from = %self.created_formats(), "materializing CSR");
            self.source_coo()?.to_csr()
        })
    }

    fn csc(&self) -> Result<&CscMatrix> {
        self.ensure_allowed(SparseFormat::Csc)?;
        self.csc.get_or_try_init(|| {
            tracing::debug!(from = %self.created_formats(), "materializing CSC");
            self.source_coo()?.to_csc()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coo() -> CooMatrix {
        CooMatrix::from_slices(&[0i64, 1, 2, 2], &[1, 2, 0, 1], 3, 3, Context::cpu()).unwrap()
    }

    #[test]
    fn test_lazy_materialization() {
        let g = UnitGraph::from_coo(coo());
        assert_eq!(g.created_formats(), FormatCode::COO);
        let csr = g.csr().unwrap();
        assert_eq!(csr.indptr().to_vec::<i64>(), vec![0, 1, 2, 4]);
        assert_eq!(g.created_formats(), FormatCode::COO | FormatCode::CSR);
    }

    #[test]
    fn test_csc_from_csr_only() {
        let csr = coo().to_csr().unwrap();
        let g = UnitGraph::from_csr(csr).with_formats(FormatCode::CSR | FormatCode::CSC).unwrap();
        let csc = g.csc().unwrap();
        assert_eq!(csc.indptr().to_vec::<i64>(), vec![0, 1, 3, 4]);
        assert_eq!(csc.edge_ids().unwrap().to_vec::<i64>(), vec![2, 0, 3, 1]);
        assert!(!g.created_formats().contains(SparseFormat::Coo));
    }

    #[test]
    fn test_disallowed_format() {
        let g = UnitGraph::from_coo(coo()).with_formats(FormatCode::CSC).unwrap();
        assert_eq!(g.created_formats(), FormatCode::CSC);
        assert!(matches!(
            g.coo(),
            Err(Error::FormatNotAllowed { format: SparseFormat::Coo })
        ));
    }

    #[test]
    fn test_empty_mask_rejected() {
        assert!(UnitGraph::from_coo(coo()).with_formats(FormatCode::NONE).is_err());
    }

    #[test]
    fn test_hypersparse() {
        let g = UnitGraph::from_coo(coo());
        assert!(!g.is_hypersparse());

        let big = CooMatrix::from_slices(&[0i64], &[0], 2_000_000, 1, Context::cpu()).unwrap();
        assert!(UnitGraph::from_coo(big).is_hypersparse());
    }

    #[test]
    fn test_dims() {
        let g = UnitGraph::from_coo(coo());
        let dims = g.dims();
        assert_eq!((dims.src, dims.edge, dims.dst), (3, 4, 3));
        assert_eq!(g.num_edge_types(), 1);
    }
}
