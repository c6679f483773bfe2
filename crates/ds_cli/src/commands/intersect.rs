//! intersect subcommand: valid intersections of candidate cases.

use anyhow::Result;
use clap::Args;
use ds_core::Bound;
use ds_engine::{DesignSpace, IntersectionOrders};

use super::{bounds_from, parse_bound, print_json, resolve_ids};

#[derive(Args, Debug)]
pub struct IntersectArgs {
    /// Candidate case identifiers (or signatures with --by-signature)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Intersection orders to report, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "2")]
    pub orders: Vec<usize>,

    /// Parameter bound, `name=value` or `name=min:max` (repeatable)
    #[arg(long = "bound", value_parser = parse_bound)]
    pub bounds: Vec<(String, Bound)>,

    #[arg(long, default_value_t = false)]
    pub by_signature: bool,

    /// Count intersections that only touch the bounds on a wall
    #[arg(long, default_value_t = false)]
    pub non_strict: bool,
}

pub fn run(space: &DesignSpace, args: &IntersectArgs) -> Result<()> {
    let orders = IntersectionOrders::new(args.orders.iter().copied())?;
    let bounds = bounds_from(&args.bounds);
    let ids = resolve_ids(space, &args.ids, args.by_signature)?;
    let strict = space.engine_options().strict && !args.non_strict;
    let entries = space.valid_intersecting_cases(&orders, &ids, bounds.as_ref(), strict)?;
    print_json(&entries)
}
