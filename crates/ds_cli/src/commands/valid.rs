//! valid subcommand: cases valid within bounds.

use anyhow::Result;
use clap::Args;
use ds_core::Bound;
use ds_engine::DesignSpace;

use super::{bounds_from, parse_bound, print_json};

#[derive(Args, Debug)]
pub struct ValidArgs {
    /// Parameter bound, `name=value` or `name=min:max` (repeatable)
    #[arg(long = "bound", value_parser = parse_bound)]
    pub bounds: Vec<(String, Bound)>,

    /// Keep cyclical cases instead of listing their subcases
    #[arg(long, default_value_t = false)]
    pub no_expand: bool,

    /// Count cases that only touch the bounds on a wall
    #[arg(long, default_value_t = false)]
    pub non_strict: bool,
}

pub fn run(space: &DesignSpace, args: &ValidArgs) -> Result<()> {
    let bounds = bounds_from(&args.bounds);
    let strict = space.engine_options().strict && !args.non_strict;
    let ids = space.valid_cases(bounds.as_ref(), !args.no_expand, strict)?;
    let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
    print_json(&names)
}
