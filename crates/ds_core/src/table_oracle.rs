//! In-memory oracle backed by explicit parameter boxes.
//!
//! Each listed case owns an open box: one `(min, max)` interval per
//! independent variable, unbounded where unspecified. A region is valid when
//! the intersection of its member boxes, its constraints and the query
//! bounds is non-empty: with `strict` the intersection must have interior
//! (pinned parameters must lie strictly inside), otherwise touching walls is
//! enough. Sets listed under `exclusive` are infeasible together whatever
//! their boxes say. Cases of the universe that are not listed exist but are
//! never valid.
//!
//! Case numbers pack signatures in mixed radix over the term counts, first
//! equation most significant: with term counts `[2, 3]`, `11 -> 1`,
//! `13 -> 3`, `21 -> 4`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use ds_signature::{CaseId, Signature};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::bounds::SliceBounds;
use crate::equations::Equations;
use crate::error::OracleError;
use crate::oracle::{
    CaseStructure, DesignSpaceOracle, OracleSettings, ParameterPoint, PointQuery, Region,
    SystemInfo,
};

/// Open interval; a missing end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Interval {
            min: Some(min),
            max: Some(max),
        }
    }

    fn ends(&self) -> (f64, f64) {
        (
            self.min.unwrap_or(f64::NEG_INFINITY),
            self.max.unwrap_or(f64::INFINITY),
        )
    }
}

/// Subcase of a cyclical table case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSubcase {
    #[serde(default)]
    pub region: BTreeMap<String, Interval>,
    #[serde(default)]
    pub subcases: Vec<TableSubcase>,
}

impl TableSubcase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.region.insert(name.into(), Interval::new(min, max));
        self
    }
}

/// One listed case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCase {
    pub signature: Signature,
    #[serde(default)]
    pub region: BTreeMap<String, Interval>,
    /// Reduced system; the model's equations when empty.
    #[serde(default)]
    pub equations: Vec<String>,
    #[serde(default)]
    pub auxiliary_variables: Vec<String>,
    /// Non-empty for structurally cyclical cases.
    #[serde(default)]
    pub subcases: Vec<TableSubcase>,
}

impl TableCase {
    pub fn new(signature: Signature) -> Self {
        TableCase {
            signature,
            region: BTreeMap::new(),
            equations: Vec::new(),
            auxiliary_variables: Vec::new(),
            subcases: Vec::new(),
        }
    }

    pub fn with_range(mut self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.region.insert(name.into(), Interval::new(min, max));
        self
    }

    pub fn with_subcases(mut self, subcases: Vec<TableSubcase>) -> Self {
        self.subcases = subcases;
        self
    }

    pub fn with_equations<S: Into<String>>(
        mut self,
        equations: impl IntoIterator<Item = S>,
    ) -> Self {
        self.equations = equations.into_iter().map(Into::into).collect();
        self
    }
}

/// Serializable description of a table-backed design space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
    pub equations: Vec<String>,
    #[serde(default)]
    pub auxiliary_variables: Vec<String>,
    pub independent_variables: Vec<String>,
    /// Number of power-law terms per equation.
    pub term_counts: Vec<u32>,
    #[serde(default)]
    pub cases: Vec<TableCase>,
    /// Case sets that are never simultaneously feasible.
    #[serde(default)]
    pub exclusive: Vec<Vec<CaseId>>,
}

impl TableModel {
    pub fn new<S: Into<String>>(
        equations: impl IntoIterator<Item = S>,
        independent_variables: impl IntoIterator<Item = S>,
        term_counts: impl IntoIterator<Item = u32>,
    ) -> Self {
        TableModel {
            equations: equations.into_iter().map(Into::into).collect(),
            auxiliary_variables: Vec::new(),
            independent_variables: independent_variables.into_iter().map(Into::into).collect(),
            term_counts: term_counts.into_iter().collect(),
            cases: Vec::new(),
            exclusive: Vec::new(),
        }
    }

    pub fn with_case(mut self, case: TableCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn with_exclusive(mut self, ids: impl IntoIterator<Item = CaseId>) -> Self {
        self.exclusive.push(ids.into_iter().collect());
        self
    }

    /// Total number of cases: the product of the term counts.
    pub fn number_of_cases(&self) -> u64 {
        self.term_counts
            .iter()
            .fold(1u64, |acc, &t| acc.saturating_mul(u64::from(t)))
    }

    /// Mixed-radix case number of a signature.
    pub fn case_number(&self, signature: &Signature) -> Option<u64> {
        if signature.len() != self.term_counts.len() {
            return None;
        }
        let mut number = 0u64;
        for (&term, &count) in signature.terms().iter().zip(&self.term_counts) {
            if term == 0 || term > count {
                return None;
            }
            number = number * u64::from(count) + u64::from(term - 1);
        }
        Some(number + 1)
    }

    /// Inverse of [`TableModel::case_number`].
    pub fn signature_of(&self, number: u64) -> Option<Signature> {
        if number == 0 || number > self.number_of_cases() {
            return None;
        }
        let mut rest = number - 1;
        let mut terms = vec![0u32; self.term_counts.len()];
        for (slot, &count) in terms.iter_mut().zip(&self.term_counts).rev() {
            let count = u64::from(count);
            *slot = (rest % count) as u32 + 1;
            rest /= count;
        }
        Some(Signature::new(terms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Relation {
    Less,
    Greater,
}

/// `name < value` / `name > value` (also `<=`, `>=`).
#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    name: String,
    relation: Relation,
    value: f64,
}

impl Constraint {
    fn parse(text: &str) -> Result<Self, OracleError> {
        let unsupported = || OracleError::Unsupported(format!("constraint \"{}\"", text));
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [name, op, value] = tokens.as_slice() else {
            return Err(unsupported());
        };
        let relation = match *op {
            "<" | "<=" => Relation::Less,
            ">" | ">=" => Relation::Greater,
            _ => return Err(unsupported()),
        };
        let value = value.parse::<f64>().map_err(|_| unsupported())?;
        Ok(Constraint {
            name: name.to_string(),
            relation,
            value,
        })
    }

    fn apply(&self, region: &mut BTreeMap<String, (f64, f64)>) {
        let entry = region
            .entry(self.name.clone())
            .or_insert((f64::NEG_INFINITY, f64::INFINITY));
        match self.relation {
            Relation::Less => entry.1 = entry.1.min(self.value),
            Relation::Greater => entry.0 = entry.0.max(self.value),
        }
    }
}

type OpenBox = BTreeMap<String, (f64, f64)>;

fn intersect_into(target: &mut OpenBox, region: &BTreeMap<String, Interval>) {
    for (name, interval) in region {
        let (lo, hi) = interval.ends();
        let entry = target
            .entry(name.clone())
            .or_insert((f64::NEG_INFINITY, f64::INFINITY));
        entry.0 = entry.0.max(lo);
        entry.1 = entry.1.min(hi);
    }
}

/// Oracle answering from a [`TableModel`].
#[derive(Debug)]
pub struct TableOracle {
    model: TableModel,
    by_number: FxHashMap<u64, usize>,
    global_constraints: RwLock<Vec<Constraint>>,
    queries: AtomicUsize,
}

impl TableOracle {
    pub fn new(model: TableModel) -> Result<Self, OracleError> {
        if model.term_counts.len() != model.equations.len() {
            return Err(OracleError::Failure(format!(
                "{} term counts for {} equations",
                model.term_counts.len(),
                model.equations.len()
            )));
        }
        let mut by_number = FxHashMap::default();
        for (index, case) in model.cases.iter().enumerate() {
            let number = model.case_number(&case.signature).ok_or_else(|| {
                OracleError::Failure(format!(
                    "signature {} does not fit term counts {:?}",
                    case.signature, model.term_counts
                ))
            })?;
            if by_number.insert(number, index).is_some() {
                return Err(OracleError::Failure(format!(
                    "signature {} listed twice",
                    case.signature
                )));
            }
        }
        Ok(TableOracle {
            model,
            by_number,
            global_constraints: RwLock::new(Vec::new()),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn from_json(text: &str) -> Result<Self, OracleError> {
        let model: TableModel = serde_json::from_str(text)
            .map_err(|e| OracleError::Failure(format!("invalid table model: {}", e)))?;
        Self::new(model)
    }

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    /// Number of queries answered since construction (`prepare` excluded).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn count_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn listed(&self, number: u64) -> Option<&TableCase> {
        self.by_number.get(&number).map(|&i| &self.model.cases[i])
    }

    /// Box of a (sub)case: the intersection of every box on its path.
    fn case_box(&self, id: &CaseId) -> Option<OpenBox> {
        let case = self.listed(id.number())?;
        let mut out = OpenBox::new();
        intersect_into(&mut out, &case.region);
        let mut level = &case.subcases;
        for &index in id.subcase_path() {
            let sub = level.get((index as usize).checked_sub(1)?)?;
            intersect_into(&mut out, &sub.region);
            level = &sub.subcases;
        }
        Some(out)
    }

    fn region_box(&self, region: &Region) -> Result<Option<OpenBox>, OracleError> {
        let excluded = self
            .model
            .exclusive
            .iter()
            .any(|set| !set.is_empty() && set.iter().all(|id| region.cases.contains(id)));
        if excluded {
            return Ok(None);
        }

        let mut out = OpenBox::new();
        for id in &region.cases {
            let Some(case_box) = self.case_box(id) else {
                return Ok(None);
            };
            for (name, (lo, hi)) in case_box {
                let entry = out
                    .entry(name)
                    .or_insert((f64::NEG_INFINITY, f64::INFINITY));
                entry.0 = entry.0.max(lo);
                entry.1 = entry.1.min(hi);
            }
        }

        let globals = self
            .global_constraints
            .read()
            .unwrap_or_else(|e| e.into_inner());
        for constraint in globals.iter() {
            constraint.apply(&mut out);
        }
        for text in &region.constraints {
            Constraint::parse(text)?.apply(&mut out);
        }
        Ok(Some(out))
    }

    fn fits(&self, region: &OpenBox, bounds: Option<&SliceBounds>, strict: bool) -> bool {
        let unbounded = (f64::NEG_INFINITY, f64::INFINITY);
        let names = self
            .model
            .independent_variables
            .iter()
            .chain(
                region
                    .keys()
                    .filter(|k| !self.model.independent_variables.contains(*k)),
            );
        for name in names {
            let (lo, hi) = region.get(name).copied().unwrap_or(unbounded);
            let (bl, bh) = bounds.and_then(|b| b.get(name)).unwrap_or(unbounded);
            let ok = if strict {
                if bl == bh {
                    lo < bl && bl < hi
                } else {
                    lo.max(bl) < hi.min(bh)
                }
            } else {
                lo.max(bl) <= hi.min(bh)
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

fn interior_point(lo: f64, hi: f64) -> f64 {
    match (lo.is_finite(), hi.is_finite()) {
        (true, true) if lo > 0.0 => (lo * hi).sqrt(),
        (true, true) => (lo + hi) / 2.0,
        (true, false) if lo > 0.0 => lo * 10.0,
        (true, false) => lo + 1.0,
        (false, true) if hi > 0.0 => hi / 10.0,
        (false, true) => hi - 1.0,
        (false, false) => 1.0,
    }
}

impl DesignSpaceOracle for TableOracle {
    fn prepare(&self, settings: &OracleSettings) -> Result<SystemInfo, OracleError> {
        let parsed = settings
            .constraints
            .iter()
            .map(|c| Constraint::parse(c))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            target: "oracle",
            listed = self.model.cases.len(),
            cases = self.model.number_of_cases(),
            constraints = parsed.len(),
            "table_prepared"
        );
        *self
            .global_constraints
            .write()
            .unwrap_or_else(|e| e.into_inner()) = parsed;

        let equations = Equations::new(
            self.model.equations.iter().cloned(),
            self.model.auxiliary_variables.iter().cloned(),
        );
        Ok(SystemInfo {
            dependent_variables: equations.dependent_variables(),
            equations,
            independent_variables: self.model.independent_variables.clone(),
            number_of_cases: self.model.number_of_cases(),
        })
    }

    fn term_count(&self, equation: usize) -> Result<u32, OracleError> {
        self.count_query();
        self.model.term_counts.get(equation).copied().ok_or_else(|| {
            OracleError::Failure(format!(
                "equation index {} out of range (system has {})",
                equation,
                self.model.term_counts.len()
            ))
        })
    }

    fn signature_to_case_number(
        &self,
        signature: &Signature,
    ) -> Result<Option<u64>, OracleError> {
        self.count_query();
        Ok(self.model.case_number(signature))
    }

    fn case_structure(&self, id: &CaseId) -> Result<Option<CaseStructure>, OracleError> {
        self.count_query();
        let Some(signature) = self.model.signature_of(id.number()) else {
            return Ok(None);
        };
        let Some(case) = self.listed(id.number()) else {
            if id.is_subcase() {
                return Ok(None);
            }
            return Ok(Some(CaseStructure {
                signature,
                equations: Equations::new(
                    self.model.equations.iter().cloned(),
                    self.model.auxiliary_variables.iter().cloned(),
                ),
                subcases: None,
            }));
        };

        let mut level = &case.subcases;
        for &index in id.subcase_path() {
            let Some(sub) = (index as usize)
                .checked_sub(1)
                .and_then(|i| level.get(i))
            else {
                return Ok(None);
            };
            level = &sub.subcases;
        }

        let equations = if case.equations.is_empty() {
            Equations::new(
                self.model.equations.iter().cloned(),
                self.model.auxiliary_variables.iter().cloned(),
            )
        } else {
            Equations::new(
                case.equations.iter().cloned(),
                case.auxiliary_variables.iter().cloned(),
            )
        };
        Ok(Some(CaseStructure {
            signature,
            equations,
            subcases: (!level.is_empty()).then_some(level.len() as u32),
        }))
    }

    fn is_valid(
        &self,
        region: &Region,
        bounds: &SliceBounds,
        strict: bool,
    ) -> Result<bool, OracleError> {
        self.count_query();
        Ok(self
            .region_box(region)?
            .is_some_and(|b| self.fits(&b, Some(bounds), strict)))
    }

    fn enumerate_valid_cases(
        &self,
        bounds: Option<&SliceBounds>,
        strict: bool,
    ) -> Result<Vec<u64>, OracleError> {
        self.count_query();
        let mut out = Vec::new();
        for (&number, _) in self.by_number.iter() {
            let region = Region::of_case(CaseId::new(number));
            if let Some(b) = self.region_box(&region)? {
                if self.fits(&b, bounds, strict) {
                    out.push(number);
                }
            }
        }
        Ok(out)
    }

    fn solve_feasible_point(
        &self,
        query: &PointQuery,
    ) -> Result<Option<ParameterPoint>, OracleError> {
        self.count_query();
        let Some(region) = self.region_box(&query.region)? else {
            return Ok(None);
        };
        if !self.fits(&region, Some(&query.bounds), true) {
            tracing::trace!(target: "oracle", cases = query.region.cases.len(), "no_interior");
            return Ok(None);
        }

        let target = match &query.objective {
            Some(objective) => {
                let name = objective.as_str().trim();
                if !self.model.independent_variables.iter().any(|v| v == name) {
                    return Err(OracleError::Unsupported(format!(
                        "objective \"{}\" (only single variables are supported)",
                        name
                    )));
                }
                Some(name)
            }
            None => None,
        };

        let unbounded = (f64::NEG_INFINITY, f64::INFINITY);
        let mut point = BTreeMap::new();
        for name in &self.model.independent_variables {
            if query.project && !query.slice.contains(name) {
                continue;
            }
            let (lo, hi) = region.get(name).copied().unwrap_or(unbounded);
            let (bl, bh) = query.bounds.get(name).unwrap_or(unbounded);
            let (lo, hi) = (lo.max(bl), hi.min(bh));
            let value = if bl == bh {
                bl
            } else if target == Some(name.as_str()) && query.minimize && lo.is_finite() {
                lo
            } else if target == Some(name.as_str()) && !query.minimize && hi.is_finite() {
                hi
            } else {
                interior_point(lo, hi)
            };
            point.insert(name.clone(), value);
        }
        Ok(Some(ParameterPoint(point)))
    }
}
