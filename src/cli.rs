use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "labor-etl",
    about = "Fetch public labor statistics and write normalized JSON data files",
    version
)]
pub struct Cli {
    /// Config file [default: ./.labor-etl/config.toml, fallback ~/.config/labor-etl/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT", global = true)]
    pub report: ReportFormat,

    /// Show full skip tallies and per-state counts
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build occupation wage records from the BLS OEWS tables
    Wages(WagesArgs),
    /// Build state income records from the Census ACS API
    Income(IncomeArgs),
    /// Estimate automation risk for the occupations in the wage file
    Risk(RiskArgs),
}

#[derive(Args, Debug)]
pub struct WagesArgs {
    /// National table (URL or path), tried before the configured sources
    #[arg(long, value_name = "LOCATION")]
    pub national: Option<String>,

    /// State table (URL or path), tried before the configured sources
    #[arg(long, value_name = "LOCATION")]
    pub state: Option<String>,

    /// Output file [default: output.wages from config]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct IncomeArgs {
    /// Census API key, overriding income.api_key
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Output file [default: output.income from config]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RiskArgs {
    /// Wage job output to score [default: output.wages from config]
    #[arg(long, value_name = "FILE")]
    pub occupations: Option<PathBuf>,

    /// SOC-level AI exposure table (URL or path), tried before the configured sources
    #[arg(long, value_name = "LOCATION")]
    pub exposure: Option<String>,

    /// Output file [default: output.risk from config]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "labor-etl", "wages", "--national", "nat.zip", "-q", "--report", "json",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.report, ReportFormat::Json));
        match cli.command {
            Command::Wages(args) => {
                assert_eq!(args.national.as_deref(), Some("nat.zip"));
                assert!(args.state.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_risk_args() {
        let cli = Cli::try_parse_from([
            "labor-etl", "--config", "c.toml", "risk", "--occupations", "occ.json", "-o", "r.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Command::Risk(args) => {
                assert_eq!(args.occupations, Some(PathBuf::from("occ.json")));
                assert_eq!(args.output, Some(PathBuf::from("r.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["labor-etl"]).is_err());
    }
}
