//! Integration tests for SDDMM dispatch and the tree-reduction entry point

mod common;

use common::{arange_f32, assert_allclose_f32, init_tracing, random_f32, random_graph, small_graph, zeros_f32};
use graphops::ops::AcceleratedModule;
use graphops::prelude::*;
use graphops::sparse::{CooMatrix, FormatCode};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

fn dst_feat() -> Tensor {
    Tensor::from_slice(&[1.0f32, 1.0, 0.0, 0.0, 1.0, -1.0], &[3, 2], Context::cpu())
}

#[test]
fn test_u_dot_v() {
    init_tracing();
    let graph = small_graph();
    let lhs = arange_f32(&[4, 2]);
    let rhs = dst_feat();
    let out = zeros_f32(&[5, 1]);

    Engine::new()
        .sddmm(BinaryOp::Dot, &graph, Some(&lhs), Some(&rhs), &out, Target::Src, Target::Dst)
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![1.0, 5.0, -1.0, -1.0, -1.0]);
}

#[test]
fn test_edge_target() {
    let graph = small_graph();
    let lhs = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0], &[5, 1], Context::cpu());
    let rhs = arange_f32(&[4, 2]);
    let out = zeros_f32(&[5, 2]);

    Engine::new()
        .sddmm(BinaryOp::Mul, &graph, Some(&lhs), Some(&rhs), &out, Target::Edge, Target::Src)
        .unwrap();
    assert_eq!(
        out.to_vec::<f32>(),
        vec![0.0, 1.0, 4.0, 6.0, 6.0, 9.0, 24.0, 28.0, 20.0, 25.0]
    );
}

#[test]
fn test_broadcast_column_against_row() {
    let graph = small_graph();
    let lhs = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[4, 1], Context::cpu());
    let rhs = arange_f32(&[3, 3]);
    let out = zeros_f32(&[5, 3]);

    Engine::new()
        .sddmm(BinaryOp::Add, &graph, Some(&lhs), Some(&rhs), &out, Target::Src, Target::Dst)
        .unwrap();
    assert_eq!(
        out.to_vec::<f32>(),
        vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 8.0, 9.0, 10.0, 10.0, 11.0, 12.0, 9.0, 10.0, 11.0]
    );
}

#[test]
fn test_dot_requires_matching_last_dim() {
    let graph = small_graph();
    let lhs = zeros_f32(&[4, 3]);
    let rhs = zeros_f32(&[3, 2]);
    let out = zeros_f32(&[5, 1]);
    assert!(matches!(
        Engine::new().sddmm(BinaryOp::Dot, &graph, Some(&lhs), Some(&rhs), &out, Target::Src, Target::Dst),
        Err(Error::BroadcastError { op: "dot", .. })
    ));
}

#[test]
fn test_copy_lhs_ignores_absent_rhs() {
    let graph = small_graph();
    let lhs = arange_f32(&[4, 2]);
    let out = zeros_f32(&[5, 2]);

    Engine::new()
        .sddmm(BinaryOp::CopyLhs, &graph, Some(&lhs), None, &out, Target::Src, Target::Dst)
        .unwrap();
    assert_eq!(
        out.to_vec::<f32>(),
        vec![0.0, 1.0, 2.0, 3.0, 2.0, 3.0, 6.0, 7.0, 4.0, 5.0]
    );
}

#[test]
fn test_out_is_bound_to_edges() {
    let graph = small_graph();
    let lhs = arange_f32(&[4, 2]);
    let out = zeros_f32(&[4, 2]);
    assert!(matches!(
        Engine::new().sddmm(BinaryOp::CopyLhs, &graph, Some(&lhs), None, &out, Target::Src, Target::Dst),
        Err(Error::LeadingDimMismatch { operand: "out", expected: 5, got: 4 })
    ));
}

#[test]
fn test_csr_and_coo_paths_agree() {
    let engine = Engine::new();
    for seed in 0..3u64 {
        let coo_graph = random_graph(seed, 40, 30, 200);
        let csr_graph = random_graph(seed, 40, 30, 200).with_formats(FormatCode::CSR).unwrap();
        let lhs = random_f32(seed + 10, &[40, 2, 3]);
        let rhs = random_f32(seed + 20, &[30, 1, 3]);

        let run = |graph: &UnitGraph| {
            let out = zeros_f32(&[200, 2]);
            engine
                .sddmm(BinaryOp::Dot, graph, Some(&lhs), Some(&rhs), &out, Target::Src, Target::Dst)
                .unwrap();
            out.to_vec::<f32>()
        };
        assert_allclose_f32(&run(&coo_graph), &run(&csr_graph), 1e-6, 1e-6, &format!("seed {seed}"));
    }
}

#[test]
fn test_string_entry_point() {
    let graph = small_graph();
    let engine = Engine::new();
    let lhs = arange_f32(&[4, 2]);
    let rhs = dst_feat();
    let out = zeros_f32(&[5, 1]);

    engine.sddmm_str("dot", &graph, Some(&lhs), Some(&rhs), &out, 0, 2).unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![1.0, 5.0, -1.0, -1.0, -1.0]);

    assert!(matches!(
        engine.sddmm_str("dot", &graph, Some(&lhs), Some(&rhs), &out, 0, 5),
        Err(Error::InvalidArgument { arg: "target", .. })
    ));

    let copied = zeros_f32(&[5, 2]);
    engine.sddmm_str("copy_v", &graph, None, Some(&rhs), &copied, 0, 2).unwrap();
    assert_eq!(
        copied.to_vec::<f32>(),
        vec![1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0]
    );
}

#[test]
fn test_multi_relation_graph_is_rejected() {
    let graph = HeteroGraph::new(vec![small_graph(), small_graph(), small_graph()]).unwrap();
    let lhs = arange_f32(&[4, 2]);
    let out = zeros_f32(&[5, 2]);
    assert!(matches!(
        Engine::new().sddmm(BinaryOp::CopyLhs, &graph, Some(&lhs), None, &out, Target::Src, Target::Dst),
        Err(Error::MultiRelation { num_edge_types: 3 })
    ));
}

#[derive(Debug, Default)]
struct CountingModule {
    calls: Mutex<usize>,
}

impl AcceleratedModule for CountingModule {
    fn name(&self) -> &str {
        "counting"
    }

    fn load(&self, _: &Path) -> Result<()> {
        Ok(())
    }

    fn sddmm_tree_reduction(&self, coo: &CooMatrix, _: &Tensor, _: &Tensor, out: &Tensor) -> Result<()> {
        *self.calls.lock() += 1;
        let mut out = out.data_mut::<f32>()?;
        for (e, o) in out.iter_mut().enumerate().take(coo.nnz()) {
            *o = e as f32;
        }
        Ok(())
    }
}

#[test]
fn test_tree_reduction_falls_back_to_dot() {
    let graph = small_graph();
    let lhs = arange_f32(&[4, 2]);
    let rhs = dst_feat();

    let out = zeros_f32(&[5, 1]);
    Engine::new().sddmm_tree_reduction(&graph, &lhs, &rhs, &out).unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![1.0, 5.0, -1.0, -1.0, -1.0]);

    // a module is registered but the path is switched off
    let module = Arc::new(CountingModule::default());
    let engine = Engine::new().with_accelerated_module(module.clone());
    let out = zeros_f32(&[5, 1]);
    engine.sddmm_tree_reduction(&graph, &lhs, &rhs, &out).unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![1.0, 5.0, -1.0, -1.0, -1.0]);
    assert_eq!(*module.calls.lock(), 0);
}

#[test]
fn test_tree_reduction_uses_module() {
    let module = Arc::new(CountingModule::default());
    let engine = Engine::with_config(EngineConfig::default().with_tree_reduction(true))
        .with_accelerated_module(module.clone());
    let lhs = arange_f32(&[4, 2]);
    let rhs = dst_feat();
    let out = zeros_f32(&[5, 1]);

    engine.sddmm_tree_reduction(&small_graph(), &lhs, &rhs, &out).unwrap();
    assert_eq!(*module.calls.lock(), 1);
    assert_eq!(out.to_vec::<f32>(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    // the module only runs on COO
    let csr_only = small_graph().with_formats(FormatCode::CSR).unwrap();
    assert!(matches!(
        engine.sddmm_tree_reduction(&csr_only, &lhs, &rhs, &out),
        Err(Error::UnsupportedFormat { op: "SDDMM", .. })
    ));
    assert_eq!(*module.calls.lock(), 1);
}
