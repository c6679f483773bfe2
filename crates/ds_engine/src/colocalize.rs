//! Co-localization: one parameter point valid for several cases at once.
//!
//! The search itself is the oracle's; this module validates the slice,
//! normalizes the bounds and shapes the request.

use std::sync::Arc;

use ds_core::{DsError, Objective, ParameterBounds, ParameterPoint, PointQuery, SliceBounds};
use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseIntersection};
use crate::design_space::DesignSpace;

/// Options of a feasible-point query.
#[derive(Debug, Clone, PartialEq)]
pub struct ColocalizationRequest {
    pub p_bounds: Option<ParameterBounds>,
    /// Objective to optimize instead of returning any feasible point.
    pub optimize: Option<Objective>,
    pub minimize: bool,
    /// Return only the slice variables rather than a full point.
    pub project: bool,
    /// Extra constraints for this query only.
    pub constraints: Vec<String>,
}

impl Default for ColocalizationRequest {
    fn default() -> Self {
        ColocalizationRequest {
            p_bounds: None,
            optimize: None,
            minimize: true,
            project: true,
            constraints: Vec::new(),
        }
    }
}

impl ColocalizationRequest {
    pub fn with_bounds(mut self, bounds: ParameterBounds) -> Self {
        self.p_bounds = Some(bounds);
        self
    }

    pub fn minimizing(mut self, objective: impl Into<String>) -> Self {
        self.optimize = Some(Objective::new(objective));
        self.minimize = true;
        self
    }

    pub fn maximizing(mut self, objective: impl Into<String>) -> Self {
        self.optimize = Some(Objective::new(objective));
        self.minimize = false;
        self
    }

    /// Ask for a full-dimensional point.
    pub fn unprojected(mut self) -> Self {
        self.project = false;
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

/// Result of a co-localization query. An empty region is an ordinary
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "point", rename_all = "snake_case")]
pub enum ColocalizationOutcome {
    Located(ParameterPoint),
    InfeasibleRegion,
}

impl ColocalizationOutcome {
    pub fn is_located(&self) -> bool {
        matches!(self, ColocalizationOutcome::Located(_))
    }

    pub fn point(&self) -> Option<&ParameterPoint> {
        match self {
            ColocalizationOutcome::Located(point) => Some(point),
            ColocalizationOutcome::InfeasibleRegion => None,
        }
    }
}

/// Every slice name must be an independent variable.
pub(crate) fn check_slice(variables: &[String], slice: &[String]) -> Result<(), DsError> {
    match slice.iter().find(|name| !variables.contains(name)) {
        Some(unknown) => Err(DsError::InvalidSliceVariable(unknown.clone())),
        None => Ok(()),
    }
}

/// A case intersection with the variables a solution is sought over.
#[derive(Debug, Clone)]
pub struct CaseColocalization {
    intersection: CaseIntersection,
    slice: Vec<String>,
}

impl CaseColocalization {
    pub fn new(
        cases: impl IntoIterator<Item = Arc<Case>>,
        slice: impl IntoIterator<Item = String>,
    ) -> Result<Self, DsError> {
        Self::from_intersection(CaseIntersection::new(cases)?, slice)
    }

    pub fn from_intersection(
        intersection: CaseIntersection,
        slice: impl IntoIterator<Item = String>,
    ) -> Result<Self, DsError> {
        let slice: Vec<String> = slice.into_iter().collect();
        check_slice(&intersection.space().independent_variables, &slice)?;
        Ok(CaseColocalization {
            intersection,
            slice,
        })
    }

    pub fn intersection(&self) -> &CaseIntersection {
        &self.intersection
    }

    pub fn cases(&self) -> &[Arc<Case>] {
        self.intersection.cases()
    }

    pub fn slice(&self) -> &[String] {
        &self.slice
    }

    /// A point valid for every member case.
    pub fn valid_parameter_set(
        &self,
        request: &ColocalizationRequest,
    ) -> Result<ColocalizationOutcome, DsError> {
        let bounds = self
            .intersection
            .space()
            .slice_bounds(request.p_bounds.as_ref())?;
        self.solve(request, bounds)
    }

    pub(crate) fn solve(
        &self,
        request: &ColocalizationRequest,
        bounds: SliceBounds,
    ) -> Result<ColocalizationOutcome, DsError> {
        let mut region = self.intersection.region();
        region.constraints.extend(request.constraints.iter().cloned());
        let query = PointQuery {
            region,
            slice: self.slice.clone(),
            bounds,
            objective: request.optimize.clone(),
            minimize: request.minimize,
            project: request.project,
        };

        let point = self
            .intersection
            .space()
            .oracle
            .solve_feasible_point(&query)?;
        tracing::trace!(
            target: "colocalize",
            cases = %self.intersection,
            located = point.is_some(),
            "feasible_point"
        );
        Ok(match point {
            Some(point) => ColocalizationOutcome::Located(point),
            None => ColocalizationOutcome::InfeasibleRegion,
        })
    }
}

impl DesignSpace {
    /// Look up `inputs` and co-localize them over `slice`.
    ///
    /// The slice and the bounds are checked before any case is looked up.
    pub fn co_localize_cases<S: AsRef<str>>(
        &self,
        inputs: &[S],
        slice: &[String],
        request: &ColocalizationRequest,
        by_signature: bool,
    ) -> Result<ColocalizationOutcome, DsError> {
        check_slice(self.independent_variables(), slice)?;
        let bounds = self.normalize_bounds(request.p_bounds.as_ref())?;

        let cases = self
            .case_ids(inputs, by_signature)?
            .iter()
            .map(|id| self.case_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let colocalization = CaseColocalization::new(cases, slice.iter().cloned())?;
        let outcome = colocalization.solve(request, bounds)?;
        tracing::debug!(
            target: "colocalize",
            cases = %colocalization.intersection(),
            located = outcome.is_located(),
            "co_localize_done"
        );
        Ok(outcome)
    }
}
