//! Bottom-up growth of case intersections.
//!
//! Feasibility is monotone: a set of cases whose conjunction is empty stays
//! empty when more cases are added. Level `k` is therefore grown only from
//! the sets validated at level `k - 1`: every pair of validated sets whose
//! union has exactly `k` members yields one candidate, each candidate is
//! checked once, and only the valid ones seed the next level.
//!
//! Sets are kept as indices into the candidate case list, so members of an
//! output set appear in candidate order.

use std::collections::BTreeSet;
use std::sync::Arc;

use ds_core::{DsError, ParameterBounds, SliceBounds};
use ds_signature::CaseId;
use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseIntersection, CaseSelection};
use crate::colocalize::{check_slice, CaseColocalization, ColocalizationRequest};
use crate::design_space::DesignSpace;
use crate::fanout;

type IndexSet = BTreeSet<usize>;

/// Requested intersection orders; every order is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct IntersectionOrders(BTreeSet<usize>);

impl IntersectionOrders {
    pub fn new(orders: impl IntoIterator<Item = usize>) -> Result<Self, DsError> {
        let orders: BTreeSet<usize> = orders.into_iter().collect();
        match orders.first() {
            None => Err(DsError::InvalidIntersectionOrder(0)),
            Some(&0) => Err(DsError::InvalidIntersectionOrder(0)),
            Some(_) => Ok(IntersectionOrders(orders)),
        }
    }

    pub fn single(order: usize) -> Result<Self, DsError> {
        Self::new([order])
    }

    /// Orders `1..=max`.
    pub fn up_to(max: usize) -> Result<Self, DsError> {
        if max == 0 {
            return Err(DsError::InvalidIntersectionOrder(0));
        }
        Self::new(1..=max)
    }

    pub fn contains(&self, order: usize) -> bool {
        self.0.contains(&order)
    }

    pub fn max(&self) -> usize {
        self.0.last().copied().unwrap_or(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<usize>> for IntersectionOrders {
    type Error = DsError;

    fn try_from(orders: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(orders)
    }
}

impl From<IntersectionOrders> for Vec<usize> {
    fn from(orders: IntersectionOrders) -> Self {
        orders.0.into_iter().collect()
    }
}

/// One entry of an intersection query: a bare case for order 1, the member
/// ids otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntersectionEntry {
    Case(CaseId),
    Intersection(Vec<CaseId>),
}

impl IntersectionEntry {
    pub fn order(&self) -> usize {
        match self {
            IntersectionEntry::Case(_) => 1,
            IntersectionEntry::Intersection(ids) => ids.len(),
        }
    }

    pub fn case_ids(&self) -> Vec<CaseId> {
        match self {
            IntersectionEntry::Case(id) => vec![id.clone()],
            IntersectionEntry::Intersection(ids) => ids.clone(),
        }
    }
}

/// Candidates of size `order` from pairs of `frontier` sets, in pair order
/// and without repeats.
pub(crate) fn grow_level(frontier: &[IndexSet], order: usize) -> Vec<IndexSet> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for (i, left) in frontier.iter().enumerate() {
        for right in &frontier[i + 1..] {
            let union: IndexSet = left.union(right).copied().collect();
            if union.len() == order && seen.insert(union.clone()) {
                out.push(union);
            }
        }
    }
    out
}

/// Validated sets per level, from `seed` up to `max_order`.
///
/// Growth stops early once fewer than two sets survive a level.
fn grow_levels<F>(
    parallel: bool,
    seed: Vec<IndexSet>,
    max_order: usize,
    check: F,
) -> Result<Vec<(usize, Vec<IndexSet>)>, DsError>
where
    F: Fn(&IndexSet) -> Result<bool, DsError> + Sync,
{
    let mut levels = Vec::new();
    let mut frontier = seed;
    for order in 2..=max_order {
        if frontier.len() < 2 {
            break;
        }
        let candidates = grow_level(&frontier, order);
        let valid = fanout::evaluate(parallel, &candidates, &check)?;
        let considered = candidates.len();
        frontier = candidates
            .into_iter()
            .zip(valid)
            .filter_map(|(set, ok)| ok.then_some(set))
            .collect();
        tracing::debug!(
            target: "intersect",
            order,
            candidates = considered,
            valid = frontier.len(),
            "level_done"
        );
        levels.push((order, frontier.clone()));
    }
    Ok(levels)
}

fn dedup_ids(ids: &[CaseId]) -> Vec<CaseId> {
    let mut seen = BTreeSet::new();
    ids.iter().filter(|id| seen.insert((*id).clone())).cloned().collect()
}

fn members(cases: &[Arc<Case>], set: &IndexSet) -> Vec<Arc<Case>> {
    set.iter().map(|&i| Arc::clone(&cases[i])).collect()
}

fn member_ids(ids: &[CaseId], set: &IndexSet) -> Vec<CaseId> {
    set.iter().map(|&i| ids[i].clone()).collect()
}

impl DesignSpace {
    /// Every combination of `case_ids` of a requested order whose
    /// conjunction is valid within `p_bounds`.
    ///
    /// Entries are grouped by order, lowest first. Within an order they
    /// follow growth order. Duplicate inputs count once.
    pub fn valid_intersecting_cases(
        &self,
        intersects: &IntersectionOrders,
        case_ids: &[CaseId],
        p_bounds: Option<&ParameterBounds>,
        strict: bool,
    ) -> Result<Vec<IntersectionEntry>, DsError> {
        let slice = self.normalize_bounds(p_bounds)?;
        let ids = dedup_ids(case_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if intersects.max() > ids.len() {
            tracing::warn!(
                target: "intersect",
                requested = intersects.max(),
                candidates = ids.len(),
                "intersection order exceeds the number of candidate cases"
            );
        }
        tracing::debug!(
            target: "intersect",
            candidates = ids.len(),
            max_order = intersects.max(),
            strict,
            "intersect_start"
        );

        let cases = ids
            .iter()
            .map(|id| self.case_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let parallel = self.engine_options().parallel;
        let mut out = Vec::new();

        let seed: Vec<IndexSet> = if intersects.contains(1) {
            let valid = fanout::evaluate(parallel, &cases, |case| {
                self.context()
                    .check_region(&case.region(), &slice, strict)
            })?;
            let singles: Vec<usize> = (0..cases.len()).filter(|&i| valid[i]).collect();
            out.extend(
                singles
                    .iter()
                    .map(|&i| IntersectionEntry::Case(ids[i].clone())),
            );
            singles.into_iter().map(|i| IndexSet::from([i])).collect()
        } else {
            (0..cases.len()).map(|i| IndexSet::from([i])).collect()
        };

        let levels = grow_levels(parallel, seed, intersects.max(), |set| {
            self.intersection_is_valid(&members(&cases, set), &slice, strict)
        })?;
        for (order, sets) in levels {
            if intersects.contains(order) {
                out.extend(
                    sets.iter()
                        .map(|set| IntersectionEntry::Intersection(member_ids(&ids, set))),
                );
            }
        }
        Ok(out)
    }

    /// [`DesignSpace::valid_intersecting_cases`] with the entries
    /// materialized as cases and case intersections.
    pub fn intersecting_cases(
        &self,
        intersects: &IntersectionOrders,
        case_ids: &[CaseId],
        p_bounds: Option<&ParameterBounds>,
        strict: bool,
    ) -> Result<Vec<CaseSelection>, DsError> {
        self.valid_intersecting_cases(intersects, case_ids, p_bounds, strict)?
            .into_iter()
            .map(|entry| match entry {
                IntersectionEntry::Case(id) => Ok(CaseSelection::Single(self.case_by_id(&id)?)),
                IntersectionEntry::Intersection(ids) => {
                    let cases = ids
                        .iter()
                        .map(|id| self.case_by_id(id))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(CaseSelection::Intersection(CaseIntersection::new(cases)?))
                }
            })
            .collect()
    }

    /// The largest combinations of `case_ids` that still co-localize over
    /// `slice`.
    ///
    /// Cyclical inputs are expanded into their subcases first. Only
    /// combinations of two or more cases count; the result is empty when no
    /// pair co-localizes.
    pub fn maximum_co_localized_cases(
        &self,
        case_ids: &[CaseId],
        slice: &[String],
        p_bounds: Option<&ParameterBounds>,
    ) -> Result<Vec<Vec<CaseId>>, DsError> {
        check_slice(self.independent_variables(), slice)?;
        let bounds = self.normalize_bounds(p_bounds)?;
        let ids = self.cycles_to_subcases(&dedup_ids(case_ids))?;
        tracing::debug!(
            target: "colocalize",
            candidates = ids.len(),
            "maximum_co_localized_start"
        );

        let cases = ids
            .iter()
            .map(|id| self.case_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let request = ColocalizationRequest {
            p_bounds: p_bounds.cloned(),
            ..ColocalizationRequest::default()
        };
        let seed = (0..cases.len()).map(|i| IndexSet::from([i])).collect();
        let levels = grow_levels(self.engine_options().parallel, seed, cases.len(), |set| {
            let colocalization =
                CaseColocalization::new(members(&cases, set), slice.iter().cloned())?;
            Ok(colocalization.solve(&request, bounds.clone())?.is_located())
        })?;

        let best: Vec<Vec<CaseId>> = levels
            .into_iter()
            .rev()
            .find(|(_, sets)| !sets.is_empty())
            .map(|(order, sets)| {
                tracing::debug!(target: "colocalize", order, sets = sets.len(), "maximum_order");
                sets.iter().map(|set| member_ids(&ids, set)).collect()
            })
            .unwrap_or_default();
        Ok(best)
    }

    fn intersection_is_valid(
        &self,
        cases: &[Arc<Case>],
        slice: &SliceBounds,
        strict: bool,
    ) -> Result<bool, DsError> {
        let intersection = CaseIntersection::new(cases.iter().cloned())?;
        let valid = self
            .context()
            .check_region(&intersection.region(), slice, strict)?;
        tracing::trace!(target: "intersect", cases = %intersection, valid, "candidate_checked");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use ds_core::{TableCase, TableModel, TableOracle};

    use super::*;
    use crate::options::{DesignSpaceOptions, EngineOptions};

    fn set(items: &[usize]) -> IndexSet {
        items.iter().copied().collect()
    }

    fn ids(text: &[&str]) -> Vec<CaseId> {
        text.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn chain(parallel: bool) -> DesignSpace {
        let model = TableModel::new(["x. = a - x"], ["a"], [4])
            .with_case(TableCase::new("1".parse().unwrap()).with_range("a", 0.1, 2.0))
            .with_case(TableCase::new("2".parse().unwrap()).with_range("a", 1.0, 3.0))
            .with_case(TableCase::new("3".parse().unwrap()).with_range("a", 2.5, 10.0));
        let oracle = Arc::new(TableOracle::new(model).unwrap());
        let engine = EngineOptions {
            parallel,
            ..EngineOptions::default()
        };
        DesignSpace::with_engine_options(oracle, DesignSpaceOptions::named("chain"), engine)
            .unwrap()
    }

    #[test]
    fn unions_must_add_exactly_one_member() {
        let frontier = vec![set(&[0, 1]), set(&[1, 2]), set(&[0, 2]), set(&[2, 3])];
        let grown = grow_level(&frontier, 3);
        assert_eq!(grown, vec![set(&[0, 1, 2]), set(&[1, 2, 3]), set(&[0, 2, 3])]);
    }

    #[test]
    fn orders_reject_zero_and_empty() {
        assert_eq!(
            IntersectionOrders::new([0, 2]),
            Err(DsError::InvalidIntersectionOrder(0))
        );
        assert!(IntersectionOrders::new(Vec::new()).is_err());
        let orders = IntersectionOrders::up_to(3).unwrap();
        assert_eq!(orders.iter().collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn pairs_follow_growth_order() {
        let ds = chain(false);
        let pairs = ds
            .valid_intersecting_cases(
                &IntersectionOrders::single(2).unwrap(),
                &ids(&["1", "2", "3"]),
                None,
                true,
            )
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                IntersectionEntry::Intersection(ids(&["1", "2"])),
                IntersectionEntry::Intersection(ids(&["2", "3"])),
            ]
        );
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
    fn mixed_orders_list_singles_first() {
        let ds = chain(true);
        let out = ds
            .valid_intersecting_cases(
                &IntersectionOrders::new([1, 2]).unwrap(),
                &ids(&["3", "1", "2", "1"]),
                Some(&ParameterBounds::new().with("a", (0.5, 2.8))),
                true,
            )
            .unwrap();
        let orders: Vec<usize> = out.iter().map(IntersectionEntry::order).collect();
        assert_eq!(orders, [1, 1, 1, 2, 2]);
        assert_eq!(out[0], IntersectionEntry::Case("3".parse().unwrap()));
        assert_eq!(out[3], IntersectionEntry::Intersection(ids(&["3", "2"])));
    }

    #[test]
    fn empty_candidates_give_empty_result() {
        let ds = chain(false);
        let out = ds
            .valid_intersecting_cases(&IntersectionOrders::up_to(2).unwrap(), &[], None, true)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn materialized_entries_share_cached_cases() {
        let ds = chain(false);
        let selections = ds
            .intersecting_cases(
                &IntersectionOrders::up_to(2).unwrap(),
                &ids(&["1", "2"]),
                None,
                true,
            )
            .unwrap();
        assert_eq!(selections.len(), 3);
        let CaseSelection::Intersection(pair) = &selections[2] else {
            panic!("expected an intersection");
        };
        assert!(Arc::ptr_eq(&pair.cases()[0], &ds.case("1").unwrap()));
    }

    #[test]
    fn maximum_co_localization_keeps_top_order_only() {
        let ds = chain(false);
        let best = ds
            .maximum_co_localized_cases(&ids(&["1", "2", "3"]), &["a".to_string()], None)
            .unwrap();
        assert_eq!(best, vec![ids(&["1", "2"]), ids(&["2", "3"])]);
    }

    #[test]
    fn maximum_co_localization_is_empty_without_pairs() {
        let ds = chain(false);
        let best = ds
            .maximum_co_localized_cases(&ids(&["1", "3"]), &["a".to_string()], None)
            .unwrap();
        assert!(best.is_empty());
    }
}
