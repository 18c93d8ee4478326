//! Validation layer applied by every driver before dispatch
//!
//! Each check takes a list of named, possibly absent operands. Absent
//! operands are skipped by every check.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::graph::{GraphDims, GraphRelation, Target};
use crate::runtime::Context;
use crate::tensor::Tensor;

/// An operand name paired with the tensor, `None` when not provided
pub type Named<'a> = (&'static str, Option<&'a Tensor>);

/// An operand bound to a graph role
pub type Bound<'a> = (&'static str, Target, Option<&'a Tensor>);

fn present<'a, 'b>(operands: &'b [Named<'a>]) -> impl Iterator<Item = (&'static str, &'a Tensor)> + 'b {
    operands.iter().filter_map(|&(name, t)| t.map(|t| (name, t)))
}

/// Require a graph with exactly one edge type
pub fn check_relation<G: GraphRelation + ?Sized>(graph: &G) -> Result<()> {
    let num_edge_types = graph.num_edge_types();
    if num_edge_types != 1 {
        tracing::debug!(num_edge_types, "rejecting multi-relation graph");
        return Err(Error::MultiRelation { num_edge_types });
    }
    Ok(())
}

/// Require every present operand to live on `ctx`
pub fn check_ctx(ctx: Context, operands: &[Named<'_>]) -> Result<()> {
    for (name, t) in present(operands) {
        if t.context() != ctx {
            tracing::debug!(operand = name, expected = %ctx, got = %t.context(), "context mismatch");
            return Err(Error::ContextMismatch {
                expected: ctx,
                got: t.context(),
                operand: name,
            });
        }
    }
    Ok(())
}

/// Require every present operand to be memory-contiguous
pub fn check_contiguous(operands: &[Named<'_>]) -> Result<()> {
    for (name, t) in present(operands) {
        if !t.is_contiguous() {
            tracing::debug!(operand = name, layout = %t.layout(), "non-contiguous operand");
            return Err(Error::NotContiguous { operand: name });
        }
    }
    Ok(())
}

/// Require rank >= 2 and a leading dimension equal to the role's count
pub fn check_shape(dims: GraphDims, operands: &[Bound<'_>]) -> Result<()> {
    for &(name, role, t) in operands {
        let Some(t) = t else { continue };
        if t.ndim() < 2 {
            tracing::debug!(operand = name, ndim = t.ndim(), "rank below 2");
            return Err(Error::RankTooSmall {
                operand: name,
                ndim: t.ndim(),
            });
        }
        let expected = dims.count(role);
        if t.shape()[0] != expected {
            tracing::debug!(operand = name, %role, expected, got = t.shape()[0], "leading dimension mismatch");
            return Err(Error::LeadingDimMismatch {
                operand: name,
                expected,
                got: t.shape()[0],
            });
        }
    }
    Ok(())
}

/// Require outputs not to share storage with any other operand
///
/// Kernels write outputs while reading inputs; aliased buffers would race.
pub fn check_no_alias<'a>(outputs: &[Named<'a>], inputs: &[Named<'a>]) -> Result<()> {
    let outs: Vec<(&'static str, &'a Tensor)> = present(outputs).collect();
    for (i, &(out_name, out)) in outs.iter().enumerate() {
        let later = outs[i + 1..].iter().copied();
        for (name, t) in present(inputs).chain(later) {
            if out.shares_storage(t) {
                return Err(Error::AliasedOutput {
                    output: out_name,
                    other: name,
                });
            }
        }
    }
    Ok(())
}

/// Require every present operand to carry `dtype`
pub fn check_dtype(dtype: DType, operands: &[Named<'_>]) -> Result<()> {
    for (name, t) in present(operands) {
        if t.dtype() != dtype {
            return Err(Error::dtype_mismatch(name, dtype, t.dtype()));
        }
    }
    Ok(())
}

/// Require `t`'s feature shape to hold exactly `len` elements
pub fn check_row_len(name: &'static str, t: &Tensor, len: usize) -> Result<()> {
    if t.row_len() != len {
        return Err(Error::shape_mismatch(name, &[len], &[t.row_len()]));
    }
    Ok(())
}

/// Require two present tensors to have identical shapes
pub fn check_same_shape(name: &'static str, t: &Tensor, reference: &Tensor) -> Result<()> {
    if t.shape() != reference.shape() {
        return Err(Error::shape_mismatch(name, reference.shape(), t.shape()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(shape: &[usize]) -> Tensor {
        Tensor::zeros(shape, DType::F32, Context::cpu())
    }

    #[test]
    fn test_ctx_skips_absent() {
        let a = t(&[2, 1]);
        assert!(check_ctx(Context::cpu(), &[("a", Some(&a)), ("b", None)]).is_ok());
        let g = a.with_context(Context::cuda(0));
        assert!(matches!(
            check_ctx(Context::cpu(), &[("a", Some(&a)), ("g", Some(&g))]),
            Err(Error::ContextMismatch { operand: "g", .. })
        ));
    }

    #[test]
    fn test_contiguous() {
        let a = t(&[2, 3]);
        let at = a.transpose(0, 1).unwrap();
        assert!(check_contiguous(&[("a", Some(&a))]).is_ok());
        assert!(matches!(
            check_contiguous(&[("at", Some(&at))]),
            Err(Error::NotContiguous { operand: "at" })
        ));
    }

    #[test]
    fn test_shape_roles() {
        let dims = GraphDims { src: 3, edge: 5, dst: 4 };
        let u = t(&[3, 2]);
        let e = t(&[5, 2]);
        let v = t(&[3, 2]);
        assert!(check_shape(dims, &[("u", Target::Src, Some(&u)), ("e", Target::Edge, Some(&e))]).is_ok());
        assert!(matches!(
            check_shape(dims, &[("out", Target::Dst, Some(&v))]),
            Err(Error::LeadingDimMismatch { operand: "out", expected: 4, got: 3 })
        ));
        let flat = t(&[3]);
        assert!(matches!(
            check_shape(dims, &[("u", Target::Src, Some(&flat))]),
            Err(Error::RankTooSmall { ndim: 1, .. })
        ));
        assert!(check_shape(dims, &[("u", Target::Src, None)]).is_ok());
    }

    #[test]
    fn test_alias() {
        let a = t(&[4, 2]);
        let view = a.narrow(0, 0, 2).unwrap();
        let b = t(&[4, 2]);
        assert!(check_no_alias(&[("out", Some(&b))], &[("a", Some(&a))]).is_ok());
        assert!(matches!(
            check_no_alias(&[("out", Some(&view))], &[("a", Some(&a))]),
            Err(Error::AliasedOutput { output: "out", other: "a" })
        ));
        assert!(check_no_alias(&[("out", Some(&b)), ("arg", Some(&b))], &[]).is_err());
    }

    #[test]
    fn test_dtype() {
        let a = t(&[2, 1]);
        assert!(check_dtype(DType::F32, &[("a", Some(&a)), ("b", None)]).is_ok());
        assert!(matches!(
            check_dtype(DType::F64, &[("a", Some(&a))]),
            Err(Error::DTypeMismatch { operand: "a", .. })
        ));
    }
}
