//! End-to-end behaviour of the engine over table-backed design spaces.

mod support;

use std::sync::Arc;
use std::thread;

use ds_core::{
    CaseStructure, DesignSpaceOracle, DsError, OracleError, OracleSettings, ParameterBounds,
    ParameterPoint, PointQuery, Region, SliceBounds, SystemInfo, TableOracle,
};
use ds_engine::{
    CaseLookup, CaseSelection, ColocalizationOutcome, ColocalizationRequest, DesignSpace,
    DesignSpaceOptions, EngineOptions, IntersectionEntry, IntersectionOrders,
};
use ds_signature::{CaseId, Signature};
use support::{chain, exclusive_pairs, ids, names, three_case, three_case_model};

// ============================================================================
// Case enumeration
// ============================================================================

#[test]
fn cyclical_case_expands_into_its_subcases() {
    let (_, ds) = three_case(true);
    let expanded = ds.valid_cases(None, true, true).unwrap();
    assert_eq!(names(&expanded), ["1", "2_1", "2_2", "3"]);

    let raw = ds.valid_cases(None, false, true).unwrap();
    assert_eq!(names(&raw), ["1", "2", "3"]);
}

#[test]
fn expansion_is_ignored_without_cycle_resolution() {
    let (_, ds) = three_case(false);
    let ids = ds.valid_cases(None, true, true).unwrap();
    assert_eq!(names(&ids), ["1", "2", "3"]);
}

#[test]
fn bounds_filter_subcases() {
    let (_, ds) = three_case(true);
    let bounds = ParameterBounds::new().with("a", 5.0).with("b", (2.0, 3.0));
    let ids = ds.valid_cases(Some(&bounds), true, true).unwrap();
    assert_eq!(names(&ids), ["1", "2_2"]);
}

#[test]
fn inverted_bounds_issue_no_oracle_calls() {
    let (oracle, ds) = three_case(true);
    let before = oracle.query_count();
    let bounds = ParameterBounds::new().with("a", [5.0, 1.0]);
    let err = ds.valid_cases(Some(&bounds), true, true).unwrap_err();
    assert_eq!(
        err,
        DsError::InvertedBounds {
            name: "a".into(),
            min: 5.0,
            max: 1.0
        }
    );
    assert_eq!(oracle.query_count(), before);
}

#[test]
fn unknown_bound_names_are_rejected() {
    let (_, ds) = three_case(false);
    let bounds = ParameterBounds::new().with("zeta", 1.0);
    let err = ds.valid_cases(Some(&bounds), false, true).unwrap_err();
    assert_eq!(err, DsError::UnknownParameter("zeta".into()));
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn concurrent_lookups_build_each_case_once() {
    let (_, ds) = three_case(true);
    let cases: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ds = &ds;
                scope.spawn(move || {
                    if i % 2 == 0 {
                        ds.case("2").unwrap()
                    } else {
                        ds.case_by_id(&CaseId::new(2)).unwrap()
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(cases.iter().all(|c| Arc::ptr_eq(c, &cases[0])));
    assert_eq!(ds.cached_cases(), 1);
}

#[test]
fn subcase_lookup_goes_through_the_parent() {
    let (_, ds) = three_case(true);
    let sub = ds.case("2_1").unwrap();
    let parent = ds.case("2").unwrap();
    assert!(Arc::ptr_eq(&sub, &parent.subcases().unwrap()[0]));
    assert_eq!(sub.signature().to_string(), "2");
    assert!(!sub.is_cyclical());
}

#[test]
fn wildcard_lookup_returns_every_match() {
    let (_, ds) = three_case(false);
    let cases = ds.cases(&["*"], &CaseLookup::by_signature()).unwrap();
    let got: Vec<String> = cases.iter().map(|c| c.id().to_string()).collect();
    assert_eq!(got, ["1", "2", "3"]);
}

#[test]
fn signature_with_subcase_suffix() {
    let (_, ds) = three_case(true);
    let cases = ds.cases_with_signature("2_2").unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].id().to_string(), "2_2");
}

#[test]
fn case_validity_uses_constraints() {
    let (_, ds) = three_case(false);
    let plain = ds.case("1").unwrap();
    assert!(plain.is_valid(None, true).unwrap());

    let lookup = CaseLookup::default().with_constraint("a > 20");
    let constrained = &ds.cases(&["1"], &lookup).unwrap()[0];
    assert!(!constrained.is_valid(None, true).unwrap());
}

#[test]
fn missing_signature_is_case_not_found() {
    let (_, ds) = three_case(false);
    let err = ds.case_number(&Signature::new([4])).unwrap_err();
    assert!(matches!(err, DsError::CaseNotFound(_)));
}

// ============================================================================
// Intersections
// ============================================================================

#[test]
fn only_overlapping_pairs_intersect() {
    let (_, ds) = chain(false);
    let pairs = ds
        .valid_intersecting_cases(
            &IntersectionOrders::single(2).unwrap(),
            &ids(&["1", "2", "3"]),
            None,
            true,
        )
        .unwrap();
    let got: Vec<Vec<String>> = pairs.iter().map(|e| names(&e.case_ids())).collect();
    assert_eq!(got, vec![vec!["1", "2"], vec!["2", "3"]]);

    let triples = ds
        .valid_intersecting_cases(
            &IntersectionOrders::single(3).unwrap(),
            &ids(&["1", "2", "3"]),
            None,
            true,
        )
        .unwrap();
    assert!(triples.is_empty());
}

#[test]
fn parallel_growth_matches_sequential() {
    let excluded = [(1, 4), (2, 5), (4, 6)];
    let seq = exclusive_pairs(6, &excluded, false);
    let par = exclusive_pairs(6, &excluded, true);
    let candidates = ids(&["1", "2", "3", "4", "5", "6"]);
    let orders = IntersectionOrders::up_to(5).unwrap();

    let a = seq
        .valid_intersecting_cases(&orders, &candidates, None, true)
        .unwrap();
    let b = par
        .valid_intersecting_cases(&orders, &candidates, None, true)
        .unwrap();
    assert_eq!(a, b);
    assert!(a.iter().any(|e| e.order() == 4));
}

#[test]
fn intersections_with_bounds() {
    let (_, ds) = chain(false);
    let bounds = ParameterBounds::new().with("a", (2.6, 2.9));
    let entries = ds
        .valid_intersecting_cases(
            &IntersectionOrders::up_to(2).unwrap(),
            &ids(&["1", "2", "3"]),
            Some(&bounds),
            true,
        )
        .unwrap();
    assert_eq!(
        entries,
        vec![
            IntersectionEntry::Case(CaseId::new(2)),
            IntersectionEntry::Case(CaseId::new(3)),
            IntersectionEntry::Intersection(ids(&["2", "3"])),
        ]
    );
}

#[test]
fn materialized_intersections_compare_by_member_set() {
    let (_, ds) = chain(false);
    let selections = ds
        .intersecting_cases(
            &IntersectionOrders::single(2).unwrap(),
            &ids(&["3", "2"]),
            None,
            true,
        )
        .unwrap();
    let [CaseSelection::Intersection(found)] = selections.as_slice() else {
        panic!("expected one intersection, got {:?}", selections);
    };
    let reversed =
        ds_engine::CaseIntersection::new([ds.case("2").unwrap(), ds.case("3").unwrap()]).unwrap();
    assert_eq!(found, &reversed);
    assert!(found.is_valid(None, true).unwrap());
}

#[test]
fn entries_serialize_as_ids_and_id_lists() {
    let entries = vec![
        IntersectionEntry::Case(CaseId::new(1)),
        IntersectionEntry::Intersection(ids(&["2_1", "3"])),
    ];
    let json = serde_json::to_string(&entries).unwrap();
    assert_eq!(json, r#"["1",["2_1","3"]]"#);
}

// ============================================================================
// Co-localization
// ============================================================================

#[test]
fn co_localization_by_signature() {
    let (_, ds) = chain(false);
    let outcome = ds
        .co_localize_cases(
            &["1", "2"],
            &["a".to_string()],
            &ColocalizationRequest::default().minimizing("a"),
            true,
        )
        .unwrap();
    assert_eq!(outcome.point().and_then(|p| p.get("a")), Some(1.0));
}

#[test]
fn infeasible_co_localization_is_an_outcome() {
    let (_, ds) = chain(false);
    let outcome = ds
        .co_localize_cases(&["1", "3"], &["a".to_string()], &Default::default(), false)
        .unwrap();
    assert_eq!(outcome, ColocalizationOutcome::InfeasibleRegion);
}

#[test]
fn maximum_co_localization_expands_cycles_first() {
    let (_, ds) = three_case(true);
    let best = ds
        .maximum_co_localized_cases(&ids(&["1", "2", "3"]), &["a".to_string()], None)
        .unwrap();
    let got: Vec<Vec<String>> = best.iter().map(|set| names(set)).collect();
    assert_eq!(got, vec![vec!["1", "2_2", "3"]]);
}

// ============================================================================
// Oracle failures
// ============================================================================

/// Table oracle whose validity checks fail.
struct BrokenValidity(TableOracle);

impl DesignSpaceOracle for BrokenValidity {
    fn prepare(&self, settings: &OracleSettings) -> Result<SystemInfo, OracleError> {
        self.0.prepare(settings)
    }

    fn term_count(&self, equation: usize) -> Result<u32, OracleError> {
        self.0.term_count(equation)
    }

    fn signature_to_case_number(
        &self,
        signature: &Signature,
    ) -> Result<Option<u64>, OracleError> {
        self.0.signature_to_case_number(signature)
    }

    fn case_structure(&self, id: &CaseId) -> Result<Option<CaseStructure>, OracleError> {
        self.0.case_structure(id)
    }

    fn is_valid(&self, _: &Region, _: &SliceBounds, _: bool) -> Result<bool, OracleError> {
        Err(OracleError::Failure("solver did not converge".into()))
    }

    fn enumerate_valid_cases(
        &self,
        bounds: Option<&SliceBounds>,
        strict: bool,
    ) -> Result<Vec<u64>, OracleError> {
        self.0.enumerate_valid_cases(bounds, strict)
    }

    fn solve_feasible_point(
        &self,
        query: &PointQuery,
    ) -> Result<Option<ParameterPoint>, OracleError> {
        self.0.solve_feasible_point(query)
    }
}

#[test]
fn oracle_failures_abort_the_whole_query() {
    let oracle = BrokenValidity(TableOracle::new(three_case_model()).unwrap());
    let ds = DesignSpace::with_engine_options(
        Arc::new(oracle),
        DesignSpaceOptions::named("broken").with_resolve_cycles(true),
        EngineOptions::parallel(),
    )
    .unwrap();

    let err = ds
        .valid_intersecting_cases(
            &IntersectionOrders::up_to(2).unwrap(),
            &ids(&["1", "3"]),
            None,
            true,
        )
        .unwrap_err();
    assert_eq!(
        err,
        DsError::OracleFailure(OracleError::Failure("solver did not converge".into()))
    );

    let err = ds.valid_cases(None, true, true).unwrap_err();
    assert!(matches!(err, DsError::OracleFailure(_)));
}
