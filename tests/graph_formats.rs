//! Integration tests for graph relations, format selection and edge mapping

mod common;

use common::{arange_f32, small_graph, zeros_f32};
use graphops::prelude::*;
use graphops::sparse::{CooMatrix, CscMatrix, CsrMatrix, FormatCode};

#[test]
fn test_edge_mapping_follows_csc_order() {
    let graph = small_graph();
    let engine = Engine::new();
    let mapping = engine.edge_mapping(&graph).unwrap().expect("csc is selected");
    // dst 0: e0, e1; dst 2: e2, e3, e4
    assert_eq!(mapping.to_vec::<i64>(), vec![0, 1, 2, 3, 4]);
    assert!(graph.created_formats().contains(graphops::sparse::SparseFormat::Csc));

    let coo = CooMatrix::from_slices(&[2i32, 0, 1], &[0, 1, 0], 3, 2, Context::cpu()).unwrap();
    let graph = UnitGraph::from_coo(coo);
    let mapping = engine.edge_mapping(&graph).unwrap().expect("csc is selected");
    assert_eq!(mapping.to_vec::<i32>(), vec![0, 2, 1]);
}

#[test]
fn test_edge_mapping_is_identity_without_csc() {
    let graph = small_graph().with_formats(FormatCode::COO).unwrap();
    assert!(Engine::new().edge_mapping(&graph).unwrap().is_none());

    let hetero = HeteroGraph::new(vec![small_graph(), small_graph()]).unwrap();
    assert!(matches!(
        Engine::new().edge_mapping(&hetero),
        Err(Error::MultiRelation { num_edge_types: 2 })
    ));
}

#[test]
fn test_spmm_runs_on_compressed_input() {
    // same topology as the small fixture, given as CSR
    let indptr = Tensor::from_slice(&[0i64, 1, 3, 4, 5], &[5], Context::cpu());
    let indices = Tensor::from_slice(&[0i64, 0, 2, 2, 2], &[5], Context::cpu());
    let eids = Tensor::from_slice(&[0i64, 1, 2, 4, 3], &[5], Context::cpu());
    let csr = CsrMatrix::new(indptr, indices, Some(eids), 4, 3).unwrap();
    let graph = UnitGraph::from_csr(csr);

    let ufeat = arange_f32(&[4, 2]);
    let out = zeros_f32(&[3, 2]);
    Engine::new()
        .spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&ufeat), None, &out, ArgOutputs::none())
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![2.0, 4.0, 0.0, 0.0, 12.0, 15.0]);
}

#[test]
fn test_csc_input_keeps_edge_ids() {
    // dst 0 <- (src 1, e1), (src 0, e0); dst 1 <- (src 0, e2)
    let indptr = Tensor::from_slice(&[0i32, 2, 3], &[3], Context::cpu());
    let indices = Tensor::from_slice(&[1i32, 0, 0], &[3], Context::cpu());
    let eids = Tensor::from_slice(&[1i32, 0, 2], &[3], Context::cpu());
    let csc = CscMatrix::new(indptr, indices, Some(eids), 2, 2).unwrap();
    let graph = UnitGraph::from_csc(csc);

    let efeat = Tensor::from_slice(&[10.0f32, 20.0, 30.0], &[3, 1], Context::cpu());
    let out = zeros_f32(&[2, 1]);
    let arg_e = Tensor::zeros(&[2, 1], DType::I32, Context::cpu());
    let engine = Engine::new();
    engine
        .spmm(
            BinaryOp::CopyRhs,
            ReduceOp::Max,
            &graph,
            None,
            Some(&efeat),
            &out,
            ArgOutputs::new(None, Some(&arg_e)),
        )
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![20.0, 30.0]);
    assert_eq!(arg_e.to_vec::<i32>(), vec![1, 2]);

    let mapping = engine.edge_mapping(&graph).unwrap().expect("csc exists");
    assert_eq!(mapping.to_vec::<i32>(), vec![1, 0, 2]);
}

#[test]
fn test_disallowed_format_is_not_built() {
    let graph = small_graph().with_formats(FormatCode::COO | FormatCode::CSR).unwrap();
    assert!(matches!(
        graph.csc(),
        Err(Error::FormatNotAllowed { .. })
    ));

    // SpMM falls back to COO and still produces the CSC result
    let ufeat = arange_f32(&[4, 2]);
    let out = zeros_f32(&[3, 2]);
    Engine::new()
        .spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&ufeat), None, &out, ArgOutputs::none())
        .unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![2.0, 4.0, 0.0, 0.0, 12.0, 15.0]);
    assert!(graph.created_formats() == FormatCode::COO);
}

#[test]
fn test_out_of_range_coo_is_rejected() {
    assert!(matches!(
        CooMatrix::from_slices(&[0i32, 4], &[0, 0], 4, 1, Context::cpu()),
        Err(Error::IndexOutOfBounds { index: 4, size: 4 })
    ));
}
