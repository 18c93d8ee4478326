//! Sparse format tags and format sets

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Sparse matrix storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (src, dst, edge id) triplets.
    /// Best for: edge-major kernels, construction, format conversion
    /// Storage: O(3 * nnz)
    Coo,

    /// Compressed Sparse Row (CSR)
    ///
    /// Row pointers over source vertices + destination ids.
    /// Best for: out-edge traversal (SDDMM)
    /// Storage: O(2 * nnz + nrows + 1)
    Csr,

    /// Compressed Sparse Column (CSC)
    ///
    /// Column pointers over destination vertices + source ids.
    /// Best for: in-edge aggregation (SpMM)
    /// Storage: O(2 * nnz + ncols + 1)
    Csc,
}

impl SparseFormat {
    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
            SparseFormat::Csc => "CSC",
        }
    }

    /// The single-format set containing this format
    #[inline]
    pub const fn code(self) -> FormatCode {
        match self {
            SparseFormat::Coo => FormatCode::COO,
            SparseFormat::Csr => FormatCode::CSR,
            SparseFormat::Csc => FormatCode::CSC,
        }
    }
}

impl fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of sparse formats, one bit per format
///
/// Used for an operation's preferred and supported formats and for the
/// formats a graph allows or has already materialized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatCode(u8);

impl FormatCode {
    /// No format
    pub const NONE: Self = Self(0);
    /// COO only
    pub const COO: Self = Self(0b001);
    /// CSR only
    pub const CSR: Self = Self(0b010);
    /// CSC only
    pub const CSC: Self = Self(0b100);
    /// Every format
    pub const ALL: Self = Self(0b111);

    /// Set union, usable in constants
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True if no format is in the set
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if `format` is in the set
    #[inline]
    pub const fn contains(self, format: SparseFormat) -> bool {
        self.0 & format.code().0 != 0
    }

    /// Pick one format from the set
    ///
    /// Priority: COO, then CSR, then CSC.
    pub fn decode(self) -> Option<SparseFormat> {
        [SparseFormat::Coo, SparseFormat::Csr, SparseFormat::Csc]
            .into_iter()
            .find(|&f| self.contains(f))
    }

    /// Iterate the formats in the set in priority order
    pub fn iter(self) -> impl Iterator<Item = SparseFormat> {
        [SparseFormat::Coo, SparseFormat::Csr, SparseFormat::Csc]
            .into_iter()
            .filter(move |&f| self.contains(f))
    }
}

impl BitAnd for FormatCode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for FormatCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<SparseFormat> for FormatCode {
    fn from(format: SparseFormat) -> Self {
        format.code()
    }
}

impl fmt::Debug for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{self}}}")
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|fmt| fmt.name()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_format_display() {
        assert_eq!(SparseFormat::Coo.to_string(), "COO");
        assert_eq!(SparseFormat::Csr.to_string(), "CSR");
        assert_eq!(SparseFormat::Csc.to_string(), "CSC");
    }

    #[test]
    fn test_code_set_ops() {
        let spmm = FormatCode::CSC | FormatCode::COO;
        assert!(spmm.contains(SparseFormat::Csc));
        assert!(!spmm.contains(SparseFormat::Csr));
        assert_eq!((spmm & FormatCode::CSR), FormatCode::NONE);
        assert_eq!(spmm.to_string(), "COO, CSC");
    }

    #[test]
    fn test_decode_priority() {
        assert_eq!(FormatCode::ALL.decode(), Some(SparseFormat::Coo));
        assert_eq!((FormatCode::CSR | FormatCode::CSC).decode(), Some(SparseFormat::Csr));
        assert_eq!(FormatCode::NONE.decode(), None);
    }
}
