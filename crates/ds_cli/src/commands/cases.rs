//! cases subcommand: summaries of individual cases.

use anyhow::Result;
use clap::Args;
use ds_engine::{Case, CaseLookup, DesignSpace};
use serde::Serialize;

use super::print_json;

#[derive(Args, Debug)]
pub struct CasesArgs {
    /// Case identifiers, or signatures with --by-signature
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Read inputs as signatures; `*` matches every term of an equation
    #[arg(long, default_value_t = false)]
    pub by_signature: bool,

    /// Extra constraint attached to every case (repeatable)
    #[arg(long = "constraint")]
    pub constraints: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CaseSummary {
    id: String,
    name: String,
    signature: String,
    cyclical: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subcases: Vec<String>,
    equations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    auxiliary_variables: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<String>,
}

impl CaseSummary {
    fn of(case: &Case) -> Self {
        CaseSummary {
            id: case.id().to_string(),
            name: case.name(),
            signature: case.signature().to_string(),
            cyclical: case.is_cyclical(),
            subcases: case
                .subcases()
                .unwrap_or_default()
                .iter()
                .map(|s| s.id().to_string())
                .collect(),
            equations: case.equations().iter().map(str::to_string).collect(),
            auxiliary_variables: case.auxiliary_variables().to_vec(),
            constraints: case.constraints().to_vec(),
        }
    }
}

pub fn run(space: &DesignSpace, args: &CasesArgs) -> Result<()> {
    let lookup = CaseLookup {
        by_signature: args.by_signature,
        constraints: args.constraints.clone(),
    };
    let cases = space.cases(&args.ids, &lookup)?;
    let summaries: Vec<CaseSummary> = cases.iter().map(|c| CaseSummary::of(c)).collect();
    print_json(&summaries)
}
