//! Sparse format selector
//!
//! Picks the representation a driver runs on, preferring one the relation
//! has already built so that a call does not pay for an O(E) conversion.

use crate::error::{Error, Result};
use crate::graph::GraphRelation;
use crate::sparse::{FormatCode, SparseFormat};

/// Formats the SpMM kernels are written for
pub const SPMM_FORMATS: FormatCode = FormatCode::CSC.union(FormatCode::COO);

/// Formats the SDDMM kernels are written for
pub const SDDMM_FORMATS: FormatCode = FormatCode::CSR.union(FormatCode::COO);

/// Formats the tree-reduction SDDMM is written for
pub const TREE_REDUCTION_FORMATS: FormatCode = FormatCode::COO;

/// Select the format to run on given the operation's preferred set
///
/// 1. A preferred, allowed format that already exists wins.
/// 2. A hypersparse relation with COO built stays on COO.
/// 3. Otherwise a preferred, allowed format is built.
/// 4. Otherwise the relation's existing format is used.
///
/// Ties within a set resolve COO, then CSR, then CSC.
pub fn select_format<G: GraphRelation + ?Sized>(graph: &G, preferred: FormatCode) -> Result<SparseFormat> {
    let created = graph.created_formats();
    let common = preferred & graph.allowed_formats();

    let chosen = if let Some(f) = (common & created).decode() {
        f
    } else if graph.is_hypersparse() && created.contains(SparseFormat::Coo) {
        SparseFormat::Coo
    } else if let Some(f) = common.decode() {
        f
    } else {
        created
            .decode()
            .ok_or_else(|| Error::Backend("relation has no materialized format".into()))?
    };

    tracing::trace!(%preferred, %created, format = %chosen, "selected sparse format");
    Ok(chosen)
}

/// Check that `format` is one the operation has kernels for
pub fn ensure_supported(op: &'static str, format: SparseFormat, supported: FormatCode) -> Result<()> {
    if supported.contains(format) {
        Ok(())
    } else {
        Err(unsupported_format(op, format, supported))
    }
}

/// `UnsupportedFormat` for a format the operation has no kernel for
pub fn unsupported_format(op: &'static str, format: SparseFormat, supported: FormatCode) -> Error {
    tracing::debug!(op, %format, %supported, "unsupported sparse format");
    Error::UnsupportedFormat {
        op,
        format,
        supported: supported.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UnitGraph;
    use crate::runtime::Context;
    use crate::sparse::CooMatrix;

    fn graph() -> UnitGraph {
        let coo = CooMatrix::from_slices(&[0i32, 1, 1], &[1, 0, 1], 2, 2, Context::cpu()).unwrap();
        UnitGraph::from_coo(coo)
    }

    #[test]
    fn test_prefers_created() {
        let g = graph();
        // CSC preferred but only COO exists: build CSC
        assert_eq!(select_format(&g, FormatCode::CSC).unwrap(), SparseFormat::Csc);
        // SDDMM prefers COO, which exists
        assert_eq!(select_format(&g, FormatCode::COO).unwrap(), SparseFormat::Coo);
    }

    #[test]
    fn test_falls_back_to_created_when_preferred_disallowed() {
        let g = graph().with_formats(FormatCode::COO | FormatCode::CSR).unwrap();
        assert_eq!(select_format(&g, FormatCode::CSC).unwrap(), SparseFormat::Coo);
    }

    #[test]
    fn test_existing_preferred_beats_priority() {
        let g = graph().with_formats(FormatCode::CSR | FormatCode::CSC).unwrap();
        g.csc().unwrap();
        // only CSR and CSC exist; CSC is preferred and built
        assert_eq!(select_format(&g, FormatCode::CSC).unwrap(), SparseFormat::Csc);
        assert_eq!(select_format(&g, FormatCode::COO).unwrap(), SparseFormat::Csr);
    }

    #[test]
    fn test_hypersparse_stays_on_coo() {
        let coo = CooMatrix::from_slices(&[5i64], &[0], 3_000_000, 1, Context::cpu()).unwrap();
        let g = UnitGraph::from_coo(coo);
        assert_eq!(select_format(&g, FormatCode::CSC).unwrap(), SparseFormat::Coo);
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported("SpMM", SparseFormat::Csc, SPMM_FORMATS).is_ok());
        let err = ensure_supported("SpMM", SparseFormat::Csr, SPMM_FORMATS).unwrap_err();
        assert!(err.to_string().contains("COO, CSC"));
    }
}
