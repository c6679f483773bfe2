//! Cases and case intersections.
//!
//! A [`Case`] is either simple or cyclical; only the cyclical variant owns
//! subcases. Cases share an [`Arc<SpaceContext>`] with their design space
//! instead of pointing back at it, so the design space's cache never forms
//! a reference cycle with the cases it holds.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ds_core::{DesignSpaceOracle, DsError, Equations, ParameterBounds, Region, SliceBounds};
use ds_signature::{CaseId, Signature};

use crate::options::EngineOptions;

/// The parts of a design space that its cases need after construction.
pub(crate) struct SpaceContext {
    pub(crate) oracle: Arc<dyn DesignSpaceOracle>,
    pub(crate) name: String,
    pub(crate) independent_variables: Vec<String>,
    pub(crate) engine: EngineOptions,
}

impl SpaceContext {
    /// Normalize caller bounds into the box sent to the oracle.
    pub(crate) fn slice_bounds(
        &self,
        bounds: Option<&ParameterBounds>,
    ) -> Result<SliceBounds, DsError> {
        match bounds {
            Some(b) => b.normalize(
                &self.independent_variables,
                self.engine.default_lower,
                self.engine.default_upper,
            ),
            None => Ok(SliceBounds::open_box(
                &self.independent_variables,
                self.engine.default_lower,
                self.engine.default_upper,
            )),
        }
    }

    pub(crate) fn check_region(
        &self,
        region: &Region,
        bounds: &SliceBounds,
        strict: bool,
    ) -> Result<bool, DsError> {
        Ok(self.oracle.is_valid(region, bounds, strict)?)
    }
}

impl fmt::Debug for SpaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceContext")
            .field("name", &self.name)
            .field("independent_variables", &self.independent_variables)
            .finish_non_exhaustive()
    }
}

/// Fields shared by both case variants.
#[derive(Debug, Clone)]
pub struct CaseData {
    pub(crate) id: CaseId,
    pub(crate) signature: Signature,
    pub(crate) equations: Equations,
    pub(crate) constraints: Vec<String>,
    pub(crate) space: Arc<SpaceContext>,
}

/// One region of parameter space.
#[derive(Debug, Clone)]
pub enum Case {
    Simple(CaseData),
    /// Structurally degenerate case, split into ordered subcases
    /// `id_1 .. id_k`.
    Cyclical {
        data: CaseData,
        subcases: Vec<Arc<Case>>,
    },
}

impl Case {
    fn data(&self) -> &CaseData {
        match self {
            Case::Simple(data) => data,
            Case::Cyclical { data, .. } => data,
        }
    }

    pub fn id(&self) -> &CaseId {
        &self.data().id
    }

    /// `"<space>: Case <id>"`, marked when cyclical.
    pub fn name(&self) -> String {
        let data = self.data();
        if self.is_cyclical() {
            format!("{}: Case {} (cyclical)", data.space.name, data.id)
        } else {
            format!("{}: Case {}", data.space.name, data.id)
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.data().signature
    }

    /// Dominant-term system of the case.
    pub fn equations(&self) -> &Equations {
        &self.data().equations
    }

    pub fn auxiliary_variables(&self) -> &[String] {
        self.data().equations.auxiliary_variables()
    }

    pub fn constraints(&self) -> &[String] {
        &self.data().constraints
    }

    pub fn independent_variables(&self) -> &[String] {
        &self.data().space.independent_variables
    }

    pub fn is_cyclical(&self) -> bool {
        matches!(self, Case::Cyclical { .. })
    }

    /// `None` for simple cases.
    pub fn subcases(&self) -> Option<&[Arc<Case>]> {
        match self {
            Case::Simple(_) => None,
            Case::Cyclical { subcases, .. } => Some(subcases),
        }
    }

    pub fn number_of_subcases(&self) -> usize {
        self.subcases().map_or(0, <[_]>::len)
    }

    /// Subcase `index` (1-based).
    pub fn subcase(&self, index: u32) -> Option<&Arc<Case>> {
        let i = (index as usize).checked_sub(1)?;
        self.subcases()?.get(i)
    }

    /// Region sent to the oracle for this case alone.
    pub fn region(&self) -> Region {
        Region::new(vec![self.id().clone()], self.constraints().to_vec())
    }

    /// Whether the case has a non-empty region within `bounds`.
    pub fn is_valid(
        &self,
        bounds: Option<&ParameterBounds>,
        strict: bool,
    ) -> Result<bool, DsError> {
        let space = &self.data().space;
        let slice = space.slice_bounds(bounds)?;
        space.check_region(&self.region(), &slice, strict)
    }

    /// Copy of this case restricted by extra constraints.
    pub fn with_constraints(&self, constraints: impl IntoIterator<Item = String>) -> Case {
        let mut copy = self.clone();
        let data = match &mut copy {
            Case::Simple(data) => data,
            Case::Cyclical { data, .. } => data,
        };
        data.constraints.extend(constraints);
        copy
    }

    pub(crate) fn space(&self) -> &Arc<SpaceContext> {
        &self.data().space
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Case {} ({})", self.id(), self.signature())
    }
}

/// Conjunction of two or more distinct cases.
///
/// Two intersections with the same member ids are equal whatever the
/// member order.
#[derive(Debug, Clone)]
pub struct CaseIntersection {
    cases: Vec<Arc<Case>>,
    constraints: Vec<String>,
}

impl CaseIntersection {
    /// Duplicate members are dropped; fewer than two distinct cases is an
    /// error.
    pub fn new(cases: impl IntoIterator<Item = Arc<Case>>) -> Result<Self, DsError> {
        let mut seen = BTreeSet::new();
        let cases: Vec<Arc<Case>> = cases
            .into_iter()
            .filter(|c| seen.insert(c.id().clone()))
            .collect();
        if cases.len() < 2 {
            return Err(DsError::TooFewCases {
                needed: 2,
                got: cases.len(),
            });
        }
        Ok(CaseIntersection {
            cases,
            constraints: Vec::new(),
        })
    }

    pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = String>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    pub fn cases(&self) -> &[Arc<Case>] {
        &self.cases
    }

    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    /// Member ids in member order.
    pub fn case_ids(&self) -> Vec<CaseId> {
        self.cases.iter().map(|c| c.id().clone()).collect()
    }

    pub fn id_set(&self) -> BTreeSet<CaseId> {
        self.cases.iter().map(|c| c.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Member regions, member constraints and the intersection's own
    /// constraints, conjoined.
    pub fn region(&self) -> Region {
        let mut constraints: Vec<String> = self
            .cases
            .iter()
            .flat_map(|c| c.constraints().iter().cloned())
            .collect();
        constraints.extend(self.constraints.iter().cloned());
        Region::new(self.case_ids(), constraints)
    }

    pub fn is_valid(
        &self,
        bounds: Option<&ParameterBounds>,
        strict: bool,
    ) -> Result<bool, DsError> {
        let space = self.space();
        let slice = space.slice_bounds(bounds)?;
        space.check_region(&self.region(), &slice, strict)
    }

    pub(crate) fn space(&self) -> &Arc<SpaceContext> {
        // `new` guarantees at least two members.
        self.cases[0].space()
    }
}

impl PartialEq for CaseIntersection {
    fn eq(&self, other: &Self) -> bool {
        self.id_set() == other.id_set()
    }
}

impl Eq for CaseIntersection {}

impl fmt::Display for CaseIntersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cases ")?;
        for (i, case) in self.cases.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", case.id())?;
        }
        Ok(())
    }
}

/// A materialized entry of an intersection query.
#[derive(Debug, Clone)]
pub enum CaseSelection {
    Single(Arc<Case>),
    Intersection(CaseIntersection),
}

impl CaseSelection {
    pub fn case_ids(&self) -> Vec<CaseId> {
        match self {
            CaseSelection::Single(case) => vec![case.id().clone()],
            CaseSelection::Intersection(inter) => inter.case_ids(),
        }
    }
}
