//! arw-inspect CLI
//!
//! Inspects a site's llms.txt and machine views, and estimates how many
//! tokens an agent saves by reading them instead of scraped HTML.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod logging;

use arw_inspect::check_cors::{run_check_cors, CheckCorsArgs};
use arw_inspect::compare::{run_compare, CompareArgs};
use arw_inspect::inspect::{run_inspect, InspectArgs};

#[derive(Parser)]
#[command(name = "arw-inspect")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Agent-Ready Web inspector: machine views vs HTML")]
#[command(long_about = "Fetches a site's llms.txt, its declared machine views and their HTML pages, and reports size and token savings.\n\nCommands:\n  inspect      Inspect a site\n  check-cors   Probe whether a URL answers direct requests\n  compare      Compare local machine view and HTML files")]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a site's llms.txt, machine views, and discovery files
    Inspect(InspectArgs),
    /// Probe whether a URL answers direct (non-proxied) requests
    CheckCors(CheckCorsArgs),
    /// Compare a local machine view against a local HTML file
    Compare(CompareArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Inspect(args) => run_inspect(args).await,
        Commands::CheckCors(args) => run_check_cors(args).await,
        Commands::Compare(args) => run_compare(args).await,
    }
}
