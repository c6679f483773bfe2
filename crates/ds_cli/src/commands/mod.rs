//! Subcommand handlers and the helpers they share.

pub mod cases;
pub mod colocalize;
pub mod intersect;
pub mod valid;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ds_core::{Bound, ParameterBounds, TableOracle};
use ds_engine::{DesignSpace, DesignSpaceOptions, EngineOptions};
use ds_signature::CaseId;
use serde::Serialize;

/// Options describing the design space, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SpaceArgs {
    /// JSON table model of the design space
    #[arg(long, short, global = true)]
    pub model: Option<PathBuf>,

    /// Name reported in case summaries
    #[arg(long, global = true, default_value = "Unnamed")]
    pub name: String,

    /// Split cyclical cases into subcases
    #[arg(long, global = true, default_value_t = false)]
    pub resolve_cycles: bool,

    /// Resolve co-dominant terms into separate cases
    #[arg(long, global = true, default_value_t = false)]
    pub resolve_codominance: bool,

    /// Constraint applied to the whole design space (repeatable)
    #[arg(long = "space-constraint", global = true)]
    pub space_constraints: Vec<String>,

    /// Evaluate each growth level in parallel (overrides the config file)
    #[arg(long, global = true, default_value_t = false)]
    pub parallel: bool,
}

impl SpaceArgs {
    pub fn options(&self) -> DesignSpaceOptions {
        DesignSpaceOptions {
            name: self.name.clone(),
            resolve_cycles: self.resolve_cycles,
            resolve_codominance: self.resolve_codominance,
            constraints: self.space_constraints.clone(),
        }
    }

    /// Load the model and build the design space.
    pub fn open(&self, mut engine: EngineOptions) -> Result<DesignSpace> {
        let path = self
            .model
            .as_deref()
            .context("no model given (use --model <FILE>)")?;
        if self.parallel {
            engine.parallel = true;
        }
        let oracle = load_oracle(path)?;
        let space = DesignSpace::with_engine_options(Arc::new(oracle), self.options(), engine)?;
        Ok(space)
    }
}

fn load_oracle(path: &Path) -> Result<TableOracle> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    TableOracle::from_json(&text).with_context(|| format!("invalid model {}", path.display()))
}

/// Parse `name=value` or `name=min:max`.
pub fn parse_bound(text: &str) -> Result<(String, Bound), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected name=value or name=min:max, got '{}'", text))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", text));
    }
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}' in '{}': {}", s.trim(), text, e))
    };
    let bound = match value.split_once(':') {
        Some((lo, hi)) => Bound::Range(number(lo)?, number(hi)?),
        None => Bound::Pinned(number(value)?),
    };
    Ok((name.to_string(), bound))
}

/// `None` when no bound was given.
pub fn bounds_from(pairs: &[(String, Bound)]) -> Option<ParameterBounds> {
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.iter().map(|(name, bound)| (name.clone(), *bound)).collect())
}

pub fn resolve_ids(
    space: &DesignSpace,
    inputs: &[String],
    by_signature: bool,
) -> Result<Vec<CaseId>> {
    Ok(space.case_ids(inputs, by_signature)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
