#![allow(dead_code)]

use std::sync::Arc;

use ds_core::{TableCase, TableModel, TableOracle, TableSubcase};
use ds_engine::{DesignSpace, DesignSpaceOptions, EngineOptions};
use ds_signature::{CaseId, Signature};

pub fn sig(text: &str) -> Signature {
    text.parse().expect("valid signature")
}

pub fn ids(text: &[&str]) -> Vec<CaseId> {
    text.iter().map(|t| t.parse().expect("valid case id")).collect()
}

pub fn names(ids: &[CaseId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

pub fn build(
    model: TableModel,
    options: DesignSpaceOptions,
    engine: EngineOptions,
) -> (Arc<TableOracle>, DesignSpace) {
    let oracle = Arc::new(TableOracle::new(model).expect("valid table model"));
    let ds = DesignSpace::with_engine_options(oracle.clone(), options, engine)
        .expect("design space builds");
    (oracle, ds)
}

/// One equation with three terms; case 2 is cyclical with two subcases and
/// every case is feasible.
pub fn three_case_model() -> TableModel {
    TableModel::new(["x. = a + b + c - x"], ["a", "b"], [3])
        .with_case(TableCase::new(sig("1")).with_range("a", 0.1, 10.0))
        .with_case(
            TableCase::new(sig("2"))
                .with_range("a", 1.0, 100.0)
                .with_subcases(vec![
                    TableSubcase::new().with_range("b", 0.1, 1.0),
                    TableSubcase::new().with_range("b", 1.0, 10.0),
                ]),
        )
        .with_case(TableCase::new(sig("3")).with_range("b", 5.0, 50.0))
}

pub fn three_case(resolve_cycles: bool) -> (Arc<TableOracle>, DesignSpace) {
    build(
        three_case_model(),
        DesignSpaceOptions::named("three").with_resolve_cycles(resolve_cycles),
        EngineOptions::default(),
    )
}

/// Cases 1, 2, 3 along `a`: 1 and 2 overlap, 2 and 3 overlap, 1 and 3 do
/// not.
pub fn chain_model() -> TableModel {
    TableModel::new(["x. = a - x"], ["a"], [3])
        .with_case(TableCase::new(sig("1")).with_range("a", 0.1, 2.0))
        .with_case(TableCase::new(sig("2")).with_range("a", 1.0, 3.0))
        .with_case(TableCase::new(sig("3")).with_range("a", 2.5, 10.0))
}

pub fn chain(parallel: bool) -> (Arc<TableOracle>, DesignSpace) {
    build(
        chain_model(),
        DesignSpaceOptions::named("chain"),
        EngineOptions {
            parallel,
            ..EngineOptions::default()
        },
    )
}

/// `n` unbounded cases where exactly the listed pairs are infeasible.
pub fn exclusive_pairs_model(n: u32, excluded: &[(u32, u32)]) -> TableModel {
    let mut model = TableModel::new(["x. = a - x"], ["a"], [n]);
    for i in 1..=n {
        model = model.with_case(TableCase::new(Signature::new([i])));
    }
    for &(i, j) in excluded {
        model = model.with_exclusive([CaseId::new(u64::from(i)), CaseId::new(u64::from(j))]);
    }
    model
}

pub fn exclusive_pairs(n: u32, excluded: &[(u32, u32)], parallel: bool) -> DesignSpace {
    build(
        exclusive_pairs_model(n, excluded),
        DesignSpaceOptions::named("pairs"),
        EngineOptions {
            parallel,
            ..EngineOptions::default()
        },
    )
    .1
}
