//! colocalize and max-colocalized subcommands.

use anyhow::Result;
use clap::Args;
use ds_core::Bound;
use ds_engine::{ColocalizationRequest, DesignSpace};

use super::{bounds_from, parse_bound, print_json, resolve_ids};

#[derive(Args, Debug)]
pub struct ColocalizeArgs {
    /// Cases to co-localize (or signatures with --by-signature)
    #[arg(required = true, num_args = 2..)]
    pub ids: Vec<String>,

    /// Independent variables of the slice, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub slice: Vec<String>,

    /// Parameter bound, `name=value` or `name=min:max` (repeatable)
    #[arg(long = "bound", value_parser = parse_bound)]
    pub bounds: Vec<(String, Bound)>,

    /// Minimize this objective over the co-localized region
    #[arg(long, conflicts_with = "maximize")]
    pub minimize: Option<String>,

    /// Maximize this objective over the co-localized region
    #[arg(long)]
    pub maximize: Option<String>,

    /// Report every independent variable instead of the slice only
    #[arg(long, default_value_t = false)]
    pub full: bool,

    #[arg(long, default_value_t = false)]
    pub by_signature: bool,

    /// Extra constraint for this query (repeatable)
    #[arg(long = "constraint")]
    pub constraints: Vec<String>,
}

impl ColocalizeArgs {
    fn request(&self) -> ColocalizationRequest {
        let mut request = ColocalizationRequest {
            p_bounds: bounds_from(&self.bounds),
            project: !self.full,
            constraints: self.constraints.clone(),
            ..ColocalizationRequest::default()
        };
        if let Some(objective) = &self.minimize {
            request = request.minimizing(objective.clone());
        } else if let Some(objective) = &self.maximize {
            request = request.maximizing(objective.clone());
        }
        request
    }
}

pub fn run(space: &DesignSpace, args: &ColocalizeArgs) -> Result<()> {
    let outcome =
        space.co_localize_cases(&args.ids, &args.slice, &args.request(), args.by_signature)?;
    print_json(&outcome)
}

#[derive(Args, Debug)]
pub struct MaxColocalizedArgs {
    /// Candidate cases; cyclical ones are replaced by their subcases
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Independent variables of the slice, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub slice: Vec<String>,

    /// Parameter bound, `name=value` or `name=min:max` (repeatable)
    #[arg(long = "bound", value_parser = parse_bound)]
    pub bounds: Vec<(String, Bound)>,

    #[arg(long, default_value_t = false)]
    pub by_signature: bool,
}

pub fn run_maximum(space: &DesignSpace, args: &MaxColocalizedArgs) -> Result<()> {
    let ids = resolve_ids(space, &args.ids, args.by_signature)?;
    let bounds = bounds_from(&args.bounds);
    let best = space.maximum_co_localized_cases(&ids, &args.slice, bounds.as_ref())?;
    print_json(&best)
}
