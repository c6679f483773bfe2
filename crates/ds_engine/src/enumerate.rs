//! Valid case enumeration.

use ds_core::{DsError, OracleError, ParameterBounds, Region};
use ds_signature::CaseId;

use crate::design_space::DesignSpace;
use crate::fanout;

impl DesignSpace {
    /// Ids of every case with a non-empty region within `bounds`, in case
    /// order.
    ///
    /// Bounds are checked before the oracle is consulted. With
    /// `expand_cycles` (and a design space resolving cycles), cyclical cases
    /// are replaced by those of their subcases that are valid within the
    /// same bounds. With `strict`, cases only touching the bounds on a wall
    /// are left out.
    pub fn valid_cases(
        &self,
        bounds: Option<&ParameterBounds>,
        expand_cycles: bool,
        strict: bool,
    ) -> Result<Vec<CaseId>, DsError> {
        let slice = bounds
            .map(|b| self.normalize_bounds(Some(b)))
            .transpose()?;
        tracing::debug!(
            target: "enumerate",
            bounded = slice.is_some(),
            expand_cycles,
            strict,
            "valid_cases_start"
        );

        let numbers = self
            .oracle()
            .enumerate_valid_cases(slice.as_ref(), strict)?;
        let mut ids = Vec::with_capacity(numbers.len());
        for number in numbers {
            if number == 0 || number > self.number_of_cases() {
                return Err(OracleError::Failure(format!(
                    "oracle reported case {} outside 1..={}",
                    number,
                    self.number_of_cases()
                ))
                .into());
            }
            ids.push(CaseId::new(number));
        }
        ids.sort();
        ids.dedup();

        if expand_cycles && self.resolves_cycles() {
            ids = self.valid_subcases(ids, bounds, strict)?;
        }

        tracing::debug!(target: "enumerate", valid = ids.len(), "valid_cases_done");
        Ok(ids)
    }

    /// Expand cyclical members of `ids` and keep the subcases that are valid.
    fn valid_subcases(
        &self,
        ids: Vec<CaseId>,
        bounds: Option<&ParameterBounds>,
        strict: bool,
    ) -> Result<Vec<CaseId>, DsError> {
        let expanded = self.cycles_to_subcases(&ids)?;
        let (subcases, mut kept): (Vec<CaseId>, Vec<CaseId>) =
            expanded.into_iter().partition(CaseId::is_subcase);
        if subcases.is_empty() {
            return Ok(kept);
        }

        let slice = self.normalize_bounds(bounds)?;
        let context = self.context();
        let valid = fanout::evaluate(self.engine_options().parallel, &subcases, |id| {
            context.check_region(&Region::of_case(id.clone()), &slice, strict)
        })?;
        for (id, ok) in subcases.into_iter().zip(valid) {
            tracing::trace!(target: "enumerate", case = %id, valid = ok, "subcase_checked");
            if ok {
                kept.push(id);
            }
        }
        kept.sort();
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ds_core::{TableCase, TableModel, TableOracle, TableSubcase};

    use super::*;
    use crate::options::DesignSpaceOptions;

    fn names(ids: &[CaseId]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn space(resolve_cycles: bool) -> (Arc<TableOracle>, DesignSpace) {
        let model = TableModel::new(["x. = a - x"], ["a"], [12])
            .with_case(TableCase::new("(10)".parse().unwrap()).with_range("a", 1.0, 5.0))
            .with_case(TableCase::new("9".parse().unwrap()).with_range("a", 5.0, 8.0))
            .with_case(
                TableCase::new("2".parse().unwrap())
                    .with_range("a", 0.5, 4.0)
                    .with_subcases(vec![
                        TableSubcase::new().with_range("a", 0.5, 2.0),
                        TableSubcase::new().with_range("a", 2.0, 4.0),
                    ]),
            );
        let oracle = Arc::new(TableOracle::new(model).unwrap());
        let ds = DesignSpace::new(
            oracle.clone(),
            DesignSpaceOptions::named("enum").with_resolve_cycles(resolve_cycles),
        )
        .unwrap();
        (oracle, ds)
    }

    #[test]
    fn results_use_numeric_case_order() {
        let (_, ds) = space(false);
        let ids = ds.valid_cases(None, true, true).unwrap();
        assert_eq!(names(&ids), ["2", "9", "10"]);
    }

    #[test]
    fn bounded_enumeration_respects_strictness() {
        let (_, ds) = space(false);
        let wall = ParameterBounds::new().with("a", 5.0);
        assert!(ds.valid_cases(Some(&wall), false, true).unwrap().is_empty());
        assert_eq!(
            names(&ds.valid_cases(Some(&wall), false, false).unwrap()),
            ["9", "10"]
        );
    }

    #[test]
    fn expansion_keeps_only_valid_subcases() {
        let (_, ds) = space(true);
        let bounds = ParameterBounds::new().with("a", (0.6, 1.5));
        let ids = ds.valid_cases(Some(&bounds), true, true).unwrap();
        assert_eq!(names(&ids), ["2_1", "10"]);
        let raw = ds.valid_cases(Some(&bounds), false, true).unwrap();
        assert_eq!(names(&raw), ["2", "10"]);
    }

    #[test]
    fn inverted_bounds_fail_before_any_query() {
        let (oracle, ds) = space(true);
        let before = oracle.query_count();
        let bounds = ParameterBounds::new().with("a", [5.0, 1.0]);
        let err = ds.valid_cases(Some(&bounds), true, true).unwrap_err();
        assert!(matches!(err, DsError::InvertedBounds { .. }));
        assert_eq!(oracle.query_count(), before);
    }
}
