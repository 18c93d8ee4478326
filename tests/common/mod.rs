//! Common test utilities
#![allow(dead_code)]

use graphops::prelude::*;
use graphops::sparse::CooMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Install a test-writer subscriber once; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f64 slices are close within tolerance
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(diff <= tol, "{}: element {} differs: {} vs {}", msg, i, x, y);
    }
}

/// 4 sources, 3 destinations, 5 edges
///
/// ```text
/// e0: 0 -> 0    e1: 1 -> 0    e2: 1 -> 2    e3: 3 -> 2    e4: 2 -> 2
/// ```
/// Destination 1 has no in-edges.
pub fn small_graph() -> UnitGraph {
    let coo = CooMatrix::from_slices(&[0i64, 1, 1, 3, 2], &[0, 0, 2, 2, 2], 4, 3, Context::cpu())
        .expect("valid fixture");
    UnitGraph::from_coo(coo)
}

/// Random graph with `num_edges` edges over `n` sources and `m` destinations
pub fn random_graph(seed: u64, n: usize, m: usize, num_edges: usize) -> UnitGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let row: Vec<i32> = (0..num_edges).map(|_| rng.gen_range(0..n as i32)).collect();
    let col: Vec<i32> = (0..num_edges).map(|_| rng.gen_range(0..m as i32)).collect();
    let coo = CooMatrix::from_slices(&row, &col, n, m, Context::cpu()).expect("valid fixture");
    UnitGraph::from_coo(coo)
}

/// Random f32 tensor with values in [-1, 1)
pub fn random_f32(seed: u64, shape: &[usize]) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Tensor::from_slice(&data, shape, Context::cpu())
}

/// f32 tensor holding `0, 1, 2, ...`
pub fn arange_f32(shape: &[usize]) -> Tensor {
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel).map(|i| i as f32).collect();
    Tensor::from_slice(&data, shape, Context::cpu())
}

/// Zero-filled f32 tensor
pub fn zeros_f32(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape, DType::F32, Context::cpu())
}
