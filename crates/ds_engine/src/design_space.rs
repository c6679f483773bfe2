//! The design space: case universe, lookups and bounds normalization.

use std::collections::BTreeSet;
use std::sync::Arc;

use ds_core::{DesignSpaceOracle, DsError, Equations, ParameterBounds, SliceBounds};
use ds_signature::{
    expand_wildcards, parse_case_id, parse_signature, CaseId, Signature, SignatureError,
};

use crate::cache::CaseCache;
use crate::case::{Case, CaseData, SpaceContext};
use crate::options::{DesignSpaceOptions, EngineOptions};

/// How [`DesignSpace::cases`] reads its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseLookup {
    /// Inputs are signatures (wildcards allowed) rather than case ids.
    pub by_signature: bool,
    /// Extra constraints attached to every returned case.
    pub constraints: Vec<String>,
}

impl CaseLookup {
    pub fn by_signature() -> Self {
        CaseLookup {
            by_signature: true,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

/// Case universe of one model.
///
/// Cases are built on first lookup and cached for the life of the design
/// space; every lookup of the same id returns the same `Arc`.
#[derive(Debug)]
pub struct DesignSpace {
    context: Arc<SpaceContext>,
    options: DesignSpaceOptions,
    equations: Equations,
    dependent_variables: Vec<String>,
    number_of_cases: u64,
    cache: CaseCache,
}

impl DesignSpace {
    pub fn new(
        oracle: Arc<dyn DesignSpaceOracle>,
        options: DesignSpaceOptions,
    ) -> Result<Self, DsError> {
        Self::with_engine_options(oracle, options, EngineOptions::default())
    }

    /// Build the design space, asking the oracle to prepare the case
    /// universe exactly once.
    pub fn with_engine_options(
        oracle: Arc<dyn DesignSpaceOracle>,
        options: DesignSpaceOptions,
        engine: EngineOptions,
    ) -> Result<Self, DsError> {
        let info = oracle.prepare(&options.oracle_settings())?;

        let mut seen = BTreeSet::new();
        for name in &info.independent_variables {
            if !seen.insert(name.as_str()) {
                return Err(DsError::DuplicateVariable(name.clone()));
            }
        }

        tracing::debug!(
            target: "cases",
            space = %options.name,
            equations = info.equations.len(),
            cases = info.number_of_cases,
            resolve_cycles = options.resolve_cycles,
            parallel = engine.parallel,
            "design_space_ready"
        );

        Ok(DesignSpace {
            context: Arc::new(SpaceContext {
                oracle,
                name: options.name.clone(),
                independent_variables: info.independent_variables,
                engine,
            }),
            options,
            equations: info.equations,
            dependent_variables: info.dependent_variables,
            number_of_cases: info.number_of_cases,
            cache: CaseCache::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &DesignSpaceOptions {
        &self.options
    }

    pub fn engine_options(&self) -> &EngineOptions {
        &self.context.engine
    }

    pub fn equations(&self) -> &Equations {
        &self.equations
    }

    pub fn number_of_equations(&self) -> usize {
        self.equations.len()
    }

    pub fn independent_variables(&self) -> &[String] {
        &self.context.independent_variables
    }

    pub fn dependent_variables(&self) -> &[String] {
        &self.dependent_variables
    }

    pub fn number_of_cases(&self) -> u64 {
        self.number_of_cases
    }

    pub fn resolves_cycles(&self) -> bool {
        self.options.resolve_cycles
    }

    pub fn oracle(&self) -> &Arc<dyn DesignSpaceOracle> {
        &self.context.oracle
    }

    /// Number of cases built so far.
    pub fn cached_cases(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, number: u64) -> bool {
        self.cache.contains(number)
    }

    pub(crate) fn context(&self) -> &Arc<SpaceContext> {
        &self.context
    }

    /// Number of terms available at each equation, as a signature.
    pub fn term_signature(&self) -> Result<Signature, DsError> {
        let counts = (0..self.equations.len())
            .map(|i| self.context.oracle.term_count(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Signature::new(counts))
    }

    /// Normalize caller bounds into the box sent to the oracle; no bounds
    /// gives the default open box.
    pub fn normalize_bounds(
        &self,
        bounds: Option<&ParameterBounds>,
    ) -> Result<SliceBounds, DsError> {
        self.context.slice_bounds(bounds)
    }

    /// Canonical case number of a concrete signature.
    pub fn case_number(&self, signature: &Signature) -> Result<u64, DsError> {
        if signature.len() != self.equations.len() {
            return Err(SignatureError::Length {
                input: signature.to_string(),
                expected: self.equations.len(),
                found: signature.len(),
            }
            .into());
        }
        self.context
            .oracle
            .signature_to_case_number(signature)?
            .ok_or_else(|| DsError::case_not_found(signature))
    }

    /// Case by identifier text (`"12"`, `"12_2"`).
    pub fn case(&self, identifier: &str) -> Result<Arc<Case>, DsError> {
        let id = parse_case_id(identifier)?;
        self.case_by_id(&id)
    }

    pub fn case_by_id(&self, id: &CaseId) -> Result<Arc<Case>, DsError> {
        if id.number() == 0 || id.number() > self.number_of_cases {
            return Err(DsError::case_not_found(id));
        }
        let number = id.number();
        let mut current = self
            .cache
            .get_or_try_insert(number, || self.build_case(&CaseId::new(number)))?;
        for &index in id.subcase_path() {
            let next = current
                .subcase(index)
                .cloned()
                .ok_or_else(|| DsError::case_not_found(id))?;
            current = next;
        }
        Ok(current)
    }

    /// Look up several cases.
    ///
    /// With `by_signature` each input may expand to several cases, so the
    /// output length is not tied to the input length. Lookups with
    /// constraints return fresh, uncached cases.
    pub fn cases<S: AsRef<str>>(
        &self,
        inputs: &[S],
        lookup: &CaseLookup,
    ) -> Result<Vec<Arc<Case>>, DsError> {
        let mut out = Vec::with_capacity(inputs.len());
        for input in inputs {
            let input = input.as_ref();
            if lookup.by_signature {
                out.extend(self.cases_with_signature(input)?);
            } else {
                out.push(self.case(input)?);
            }
        }
        if lookup.constraints.is_empty() {
            return Ok(out);
        }
        Ok(out
            .into_iter()
            .map(|case| Arc::new(case.with_constraints(lookup.constraints.iter().cloned())))
            .collect())
    }

    /// All cases matching signature text such as `1*2` or `(12)3_1`.
    pub fn cases_with_signature(&self, text: &str) -> Result<Vec<Arc<Case>>, DsError> {
        self.case_ids_with_signature(text)?
            .iter()
            .map(|id| self.case_by_id(id))
            .collect()
    }

    /// Ids matching signature text, in wildcard expansion order.
    pub fn case_ids_with_signature(&self, text: &str) -> Result<Vec<CaseId>, DsError> {
        let parsed = parse_signature(text)?;
        parsed.check_length(self.equations.len())?;
        let signatures =
            expand_wildcards(&parsed.pattern, |i| self.context.oracle.term_count(i))?;
        tracing::debug!(
            target: "cases",
            pattern = %parsed,
            matches = signatures.len(),
            "signature_lookup"
        );

        signatures
            .iter()
            .map(|signature| {
                let id = CaseId::new(self.case_number(signature)?);
                Ok(match parsed.subcase {
                    Some(index) => id.subcase(index),
                    None => id,
                })
            })
            .collect()
    }

    /// Parse identifiers (or signatures) into ids, expanding wildcards.
    pub fn case_ids<S: AsRef<str>>(
        &self,
        inputs: &[S],
        by_signature: bool,
    ) -> Result<Vec<CaseId>, DsError> {
        let mut out = Vec::with_capacity(inputs.len());
        for input in inputs {
            if by_signature {
                out.extend(self.case_ids_with_signature(input.as_ref())?);
            } else {
                out.push(parse_case_id(input.as_ref())?);
            }
        }
        Ok(out)
    }

    fn build_case(&self, id: &CaseId) -> Result<Case, DsError> {
        let structure = self
            .context
            .oracle
            .case_structure(id)?
            .ok_or_else(|| DsError::case_not_found(id))?;
        let data = CaseData {
            id: id.clone(),
            signature: structure.signature,
            equations: structure.equations,
            constraints: Vec::new(),
            space: Arc::clone(&self.context),
        };

        match structure.subcases {
            Some(count) if count > 0 && self.options.resolve_cycles => {
                let subcases = (1..=count)
                    .map(|i| self.build_case(&id.subcase(i)).map(Arc::new))
                    .collect::<Result<Vec<_>, _>>()?;
                tracing::debug!(
                    target: "cases",
                    case = %id,
                    subcases = count,
                    "cyclical_case_built"
                );
                Ok(Case::Cyclical { data, subcases })
            }
            _ => {
                tracing::trace!(target: "cases", case = %id, "case_built");
                Ok(Case::Simple(data))
            }
        }
    }
}
