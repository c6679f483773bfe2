//! `dspace`: design space case analysis over a JSON table model.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::cases::CasesArgs;
use commands::colocalize::{ColocalizeArgs, MaxColocalizedArgs};
use commands::intersect::IntersectArgs;
use commands::valid::ValidArgs;
use commands::SpaceArgs;

#[derive(Parser, Debug)]
#[command(name = "dspace")]
#[command(about = "Enumerate, intersect and co-localize the cases of a design space")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    space: SpaceArgs,

    /// Engine options file (TOML); defaults to ./dspace.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine progress to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show cases by identifier or signature
    Cases(CasesArgs),
    /// List the cases valid within parameter bounds
    Valid(ValidArgs),
    /// Find intersecting combinations of cases
    Intersect(IntersectArgs),
    /// Find one parameter point valid for several cases
    Colocalize(ColocalizeArgs),
    /// Find the largest combinations of cases that co-localize
    MaxColocalized(MaxColocalizedArgs),
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let engine = config::load(cli.config.as_deref());
    let space = cli.space.open(engine)?;
    match &cli.command {
        Command::Cases(args) => commands::cases::run(&space, args),
        Command::Valid(args) => commands::valid::run(&space, args),
        Command::Intersect(args) => commands::intersect::run(&space, args),
        Command::Colocalize(args) => commands::colocalize::run(&space, args),
        Command::MaxColocalized(args) => commands::colocalize::run_maximum(&space, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
