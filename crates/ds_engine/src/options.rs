//! Engine and design space configuration.

use ds_core::{OracleSettings, DEFAULT_LOWER, DEFAULT_UPPER};
use serde::{Deserialize, Serialize};

/// How queries are evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Evaluate the candidates of one growth level concurrently.
    pub parallel: bool,
    /// Lower end of the range given to parameters without a bound.
    pub default_lower: f64,
    /// Upper end of the range given to parameters without a bound.
    pub default_upper: f64,
    /// Strictness used by front-ends that do not ask explicitly.
    pub strict: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            default_lower: DEFAULT_LOWER,
            default_upper: DEFAULT_UPPER,
            strict: true,
        }
    }
}

impl EngineOptions {
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }
}

/// Configuration of one design space, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSpaceOptions {
    pub name: String,
    /// Split structurally cyclical cases into subcases.
    pub resolve_cycles: bool,
    pub resolve_codominance: bool,
    /// Constraints applied to the whole design space.
    pub constraints: Vec<String>,
}

impl Default for DesignSpaceOptions {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            resolve_cycles: false,
            resolve_codominance: false,
            constraints: Vec::new(),
        }
    }
}

impl DesignSpaceOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_resolve_cycles(mut self, resolve: bool) -> Self {
        self.resolve_cycles = resolve;
        self
    }

    pub fn with_resolve_codominance(mut self, resolve: bool) -> Self {
        self.resolve_codominance = resolve;
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub(crate) fn oracle_settings(&self) -> OracleSettings {
        OracleSettings {
            resolve_cycles: self.resolve_cycles,
            resolve_codominance: self.resolve_codominance,
            constraints: self.constraints.clone(),
        }
    }
}
