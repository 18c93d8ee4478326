//! Broadcast resolver for per-element feature shapes
//!
//! Operands are aligned on their feature shapes only: the leading dimension
//! is bound to the graph and indexed by the kernel through the topology.

use super::BinaryOp;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Alignment of two feature rows
///
/// For output position `k` (in units of `reduce_size`) and reduced index
/// `i`, the kernel reads element `lhs_index(k) * reduce_size + i` of the left
/// row and `rhs_index(k) * reduce_size + i` of the right row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcastOff {
    /// True when the feature shapes differ and offsets must be used
    pub use_bcast: bool,
    /// Elements per left row
    pub lhs_len: usize,
    /// Elements per right row
    pub rhs_len: usize,
    /// Elements per output row
    pub out_len: usize,
    /// Length of the reduced last dimension (`dot`), 1 otherwise
    pub reduce_size: usize,
    /// Left offset per output position, empty unless `use_bcast`
    pub lhs_offset: Vec<usize>,
    /// Right offset per output position, empty unless `use_bcast`
    pub rhs_offset: Vec<usize>,
}

impl BcastOff {
    /// Left row offset for output position `k`
    #[inline]
    pub fn lhs_index(&self, k: usize) -> usize {
        if self.use_bcast {
            self.lhs_offset[k]
        } else {
            k
        }
    }

    /// Right row offset for output position `k`
    #[inline]
    pub fn rhs_index(&self, k: usize) -> usize {
        if self.use_bcast {
            self.rhs_offset[k]
        } else {
            k
        }
    }
}

/// Resolve the broadcast between two optional operands of `op`
///
/// Copy operators ignore the unused side, which may be absent. Every other
/// operator needs both sides; `dot` additionally requires equal last
/// dimensions and broadcasts over the rest.
pub fn calc_bcast_off(op: BinaryOp, lhs: Option<&Tensor>, rhs: Option<&Tensor>) -> Result<BcastOff> {
    let lhs_shape = operand_shape(op.uses_lhs(), lhs, "lhs")?;
    let rhs_shape = operand_shape(op.uses_rhs(), rhs, "rhs")?;
    let lhs_len: usize = lhs_shape.iter().product();
    let rhs_len: usize = rhs_shape.iter().product();

    let broadcast_error = || Error::BroadcastError {
        op: op.name(),
        lhs: lhs.map(|t| t.shape().to_vec()).unwrap_or_default(),
        rhs: rhs.map(|t| t.shape().to_vec()).unwrap_or_default(),
    };

    if op.is_copy() {
        let out_len = if op == BinaryOp::CopyRhs { rhs_len } else { lhs_len };
        return Ok(BcastOff {
            use_bcast: false,
            lhs_len,
            rhs_len,
            out_len,
            reduce_size: 1,
            lhs_offset: Vec::new(),
            rhs_offset: Vec::new(),
        });
    }

    let (lhs_outer, rhs_outer, reduce_size) = if op == BinaryOp::Dot {
        let l = lhs_shape.last().copied().unwrap_or(1);
        let r = rhs_shape.last().copied().unwrap_or(1);
        if l != r {
            return Err(broadcast_error());
        }
        (
            &lhs_shape[..lhs_shape.len().saturating_sub(1)],
            &rhs_shape[..rhs_shape.len().saturating_sub(1)],
            l,
        )
    } else {
        (lhs_shape, rhs_shape, 1)
    };

    let ndim = lhs_outer.len().max(rhs_outer.len());
    let lpad = pad_left(lhs_outer, ndim);
    let rpad = pad_left(rhs_outer, ndim);
    let mut out_shape = Vec::with_capacity(ndim);
    for (&l, &r) in lpad.iter().zip(&rpad) {
        let d = match (l, r) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => return Err(broadcast_error()),
        };
        out_shape.push(d);
    }
    let out_len: usize = out_shape.iter().product();

    if lhs_outer == rhs_outer {
        return Ok(BcastOff {
            use_bcast: false,
            lhs_len,
            rhs_len,
            out_len,
            reduce_size,
            lhs_offset: Vec::new(),
            rhs_offset: Vec::new(),
        });
    }

    let lstrides = broadcast_strides(&lpad, &out_shape);
    let rstrides = broadcast_strides(&rpad, &out_shape);
    let mut lhs_offset = Vec::with_capacity(out_len);
    let mut rhs_offset = Vec::with_capacity(out_len);
    let mut index = vec![0usize; ndim];
    for _ in 0..out_len {
        lhs_offset.push(index.iter().zip(&lstrides).map(|(i, s)| i * s).sum());
        rhs_offset.push(index.iter().zip(&rstrides).map(|(i, s)| i * s).sum());
        for d in (0..ndim).rev() {
            index[d] += 1;
            if index[d] < out_shape[d] {
                break;
            }
            index[d] = 0;
        }
    }

    Ok(BcastOff {
        use_bcast: true,
        lhs_len,
        rhs_len,
        out_len,
        reduce_size,
        lhs_offset,
        rhs_offset,
    })
}

fn operand_shape<'a>(used: bool, t: Option<&'a Tensor>, name: &'static str) -> Result<&'a [usize]> {
    match t {
        Some(t) => Ok(t.feature_shape()),
        None if used => Err(Error::invalid_argument(name, "operand is required by this operator")),
        None => Ok(&[]),
    }
}

fn pad_left(shape: &[usize], ndim: usize) -> Vec<usize> {
    let mut padded = vec![1; ndim - shape.len()];
    padded.extend_from_slice(shape);
    padded
}

/// Row-major strides of `shape`, zeroed on dimensions broadcast to `out`
fn broadcast_strides(shape: &[usize], out: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1;
    for d in (0..shape.len()).rev() {
        strides[d] = if shape[d] == 1 && out[d] != 1 { 0 } else { acc };
        acc *= shape[d];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::Context;

    fn t(shape: &[usize]) -> Tensor {
        Tensor::zeros(shape, DType::F32, Context::cpu())
    }

    #[test]
    fn test_same_shape_no_bcast() {
        let b = calc_bcast_off(BinaryOp::Add, Some(&t(&[4, 3])), Some(&t(&[6, 3]))).unwrap();
        assert!(!b.use_bcast);
        assert_eq!((b.lhs_len, b.rhs_len, b.out_len, b.reduce_size), (3, 3, 3, 1));
        assert_eq!(b.lhs_index(2), 2);
    }

    #[test]
    fn test_column_broadcast() {
        let b = calc_bcast_off(BinaryOp::Mul, Some(&t(&[4, 1])), Some(&t(&[6, 5]))).unwrap();
        assert!(b.use_bcast);
        assert_eq!(b.out_len, 5);
        assert_eq!(b.lhs_offset, vec![0; 5]);
        assert_eq!(b.rhs_offset, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rank_broadcast() {
        // [2, 3] against [3]
        let b = calc_bcast_off(BinaryOp::Add, Some(&t(&[4, 2, 3])), Some(&t(&[6, 3]))).unwrap();
        assert_eq!(b.out_len, 6);
        assert_eq!(b.lhs_offset, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(b.rhs_offset, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_outer_broadcast() {
        // [2, 1] against [1, 3]
        let b = calc_bcast_off(BinaryOp::Sub, Some(&t(&[4, 2, 1])), Some(&t(&[6, 1, 3]))).unwrap();
        assert_eq!(b.out_len, 6);
        assert_eq!(b.lhs_offset, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(b.rhs_offset, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_incompatible() {
        let err = calc_bcast_off(BinaryOp::Add, Some(&t(&[4, 2])), Some(&t(&[4, 3]))).unwrap_err();
        match err {
            Error::BroadcastError { op, lhs, rhs } => {
                assert_eq!(op, "add");
                assert_eq!(lhs, vec![4, 2]);
                assert_eq!(rhs, vec![4, 3]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_copy_ignores_other_side() {
        let b = calc_bcast_off(BinaryOp::CopyLhs, Some(&t(&[4, 2, 3])), None).unwrap();
        assert_eq!(b.out_len, 6);
        let b = calc_bcast_off(BinaryOp::CopyRhs, Some(&t(&[4, 7])), Some(&t(&[4, 2]))).unwrap();
        assert_eq!(b.out_len, 2);
        assert!(calc_bcast_off(BinaryOp::CopyRhs, Some(&t(&[4, 2])), None).is_err());
    }

    #[test]
    fn test_dot_reduces_last_dim() {
        let b = calc_bcast_off(BinaryOp::Dot, Some(&t(&[4, 2, 8])), Some(&t(&[6, 1, 8]))).unwrap();
        assert_eq!(b.reduce_size, 8);
        assert_eq!(b.out_len, 2);
        assert_eq!(b.lhs_offset, vec![0, 1]);
        assert_eq!(b.rhs_offset, vec![0, 0]);

        let same = calc_bcast_off(BinaryOp::Dot, Some(&t(&[4, 8])), Some(&t(&[6, 8]))).unwrap();
        assert!(!same.use_bcast);
        assert_eq!((same.out_len, same.reduce_size), (1, 8));

        assert!(calc_bcast_off(BinaryOp::Dot, Some(&t(&[4, 8])), Some(&t(&[6, 4]))).is_err());
    }
}
