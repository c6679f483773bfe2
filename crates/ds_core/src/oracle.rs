//! The oracle capability.
//!
//! Everything symbolic or numeric about a design space (building the GMA
//! system, deriving case inequalities, deciding whether a region is empty,
//! finding a point inside it) is answered by a [`DesignSpaceOracle`]. The
//! engine only combines the answers. Any backend implementing the trait can
//! be plugged in; [`crate::TableOracle`] is the in-memory one.

use std::collections::BTreeMap;

use ds_signature::{CaseId, Signature};
use serde::{Deserialize, Serialize};

use crate::bounds::SliceBounds;
use crate::equations::Equations;
use crate::error::OracleError;

/// Settings handed to the oracle once, when the design space is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Precompute the subcases of structurally cyclical cases.
    pub resolve_cycles: bool,
    /// Resolve co-dominant terms into separate cases.
    pub resolve_codominance: bool,
    /// Extra constraints applied to the whole design space.
    pub constraints: Vec<String>,
}

/// Description of the system reported by [`DesignSpaceOracle::prepare`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub equations: Equations,
    pub independent_variables: Vec<String>,
    pub dependent_variables: Vec<String>,
    pub number_of_cases: u64,
}

/// Structural data for one case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseStructure {
    pub signature: Signature,
    /// Reduced (dominant-term) equation system with its auxiliary variables.
    pub equations: Equations,
    /// Number of subcases when the case is structurally cyclical.
    pub subcases: Option<u32>,
}

/// Conjunction of case regions and free-form constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub cases: Vec<CaseId>,
    pub constraints: Vec<String>,
}

impl Region {
    pub fn new(cases: Vec<CaseId>, constraints: Vec<String>) -> Self {
        Region { cases, constraints }
    }

    pub fn of_case(id: CaseId) -> Self {
        Region {
            cases: vec![id],
            constraints: Vec::new(),
        }
    }
}

/// Objective for an optimized feasible point, in the oracle's expression
/// language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Objective(pub String);

impl Objective {
    pub fn new(expr: impl Into<String>) -> Self {
        Objective(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameter assignment returned by a feasible-point query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterPoint(pub BTreeMap<String, f64>);

impl ParameterPoint {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Feasible-point request.
#[derive(Debug, Clone, PartialEq)]
pub struct PointQuery {
    pub region: Region,
    /// Variables the result is projected onto when `project` is set.
    pub slice: Vec<String>,
    pub bounds: SliceBounds,
    pub objective: Option<Objective>,
    pub minimize: bool,
    pub project: bool,
}

/// Feasibility and enumeration backend.
///
/// Implementations must be shareable across threads: the engine may fan out
/// independent feasibility checks of one growth level in parallel.
pub trait DesignSpaceOracle: Send + Sync {
    /// Build the case universe. Called exactly once per design space.
    fn prepare(&self, settings: &OracleSettings) -> Result<SystemInfo, OracleError>;

    /// Number of power-law terms available at `equation` (0-based).
    fn term_count(&self, equation: usize) -> Result<u32, OracleError>;

    /// Canonical case number of a signature, or `None` if no such case.
    fn signature_to_case_number(&self, signature: &Signature)
        -> Result<Option<u64>, OracleError>;

    /// Structure of a case or subcase, or `None` if it does not exist.
    fn case_structure(&self, id: &CaseId) -> Result<Option<CaseStructure>, OracleError>;

    /// Whether the conjunction `region` is non-empty within `bounds`.
    ///
    /// With `strict`, regions that only touch the bounds on a boundary
    /// surface count as empty.
    fn is_valid(&self, region: &Region, bounds: &SliceBounds, strict: bool)
        -> Result<bool, OracleError>;

    /// Numbers of all (top-level) cases that are valid within `bounds`, or
    /// over the whole space when `bounds` is `None`. Order is unspecified.
    fn enumerate_valid_cases(
        &self,
        bounds: Option<&SliceBounds>,
        strict: bool,
    ) -> Result<Vec<u64>, OracleError>;

    /// A point inside `query.region`, optionally optimizing an objective.
    fn solve_feasible_point(&self, query: &PointQuery)
        -> Result<Option<ParameterPoint>, OracleError>;
}
