//! `labor-etl`: fetch public labor statistics and write normalized JSON files.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Run the requested job: [`wages`], [`income`] or [`risk`]. Each job
//!    selects its inputs ([`source`]), decodes them ([`table`]), parses rows
//!    into accepted records and rejections ([`parsed`]), derives the output
//!    records ([`models`]) and writes them atomically ([`output`]).
//! 4. Render the run summary ([`report`]).
//! 5. Exit `0` (clean), `2` (output written but a source degraded), or `1`
//!    on a fatal error.

mod cli;
mod config;
mod geo;
mod income;
mod models;
mod output;
mod parsed;
mod report;
mod risk;
mod source;
mod table;
mod wages;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command, ReportFormat};
use config::load_config;
use report::console::Console;

/// Exit status for a run that wrote its output with degraded inputs.
const EXIT_DEGRADED: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_dir = std::env::current_dir()?;
    let config = load_config(&base_dir, cli.config.as_deref())?;

    // JSON reports own stdout; progress stays on stderr either way
    let console = Console::new(cli.quiet, cli.verbose);

    let summary = match &cli.command {
        Command::Wages(args) => wages::run(&config, args, &console).await?,
        Command::Income(args) => income::run(&config, args, &console).await?,
        Command::Risk(args) => risk::run(&config, args, &console).await?,
    };

    match cli.report {
        ReportFormat::Terminal => report::terminal::render_summary(&summary, cli.quiet),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if summary.degraded {
        std::process::exit(EXIT_DEGRADED);
    }

    Ok(())
}
