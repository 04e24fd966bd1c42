//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Adjudica CLI - Decide motor claims and audit the decision ledger.
#[derive(Debug, Parser)]
#[command(name = "adjudica")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Pipeline configuration file (adjudica.toml)
    #[arg(short, long, global = true, env = "ADJUDICA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids and verdicts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run claims through the full pipeline
    Run(RunArgs),

    /// Decide one claim from a facts file
    Evaluate(EvaluateArgs),

    /// Inspect and verify the decision ledger
    Ledger(LedgerArgs),

    /// Compile an authoring clause file to canonical form
    Transpile(TranspileArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Claim ids to run
    pub claim_ids: Vec<String>,

    /// Run every claim found under <data_dir>/claims
    #[arg(short, long, conflicts_with = "claim_ids")]
    pub all: bool,

    /// Claims processed concurrently
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Reference date for date checks (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for the evaluate command.
#[derive(Debug, Parser)]
pub struct EvaluateArgs {
    /// Claim id
    pub claim_id: String,

    /// JSON object of fact name to value
    #[arg(long)]
    pub facts: PathBuf,

    /// Coverage summary JSON
    #[arg(long)]
    pub coverage: Option<PathBuf>,

    /// Override a fact for this evaluation (name=JSON value, repeatable)
    #[arg(short = 'o', long = "override", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Skip screening and evaluate clauses only
    #[arg(long)]
    pub no_screening: bool,

    /// Reference date for date checks (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for ledger commands.
#[derive(Debug, Parser)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub action: LedgerAction,
}

/// Ledger actions.
#[derive(Debug, Subcommand)]
pub enum LedgerAction {
    /// Verify the hash chain
    Verify,

    /// List ledger records
    Show {
        /// Only records for this claim
        #[arg(long)]
        claim: Option<String>,

        /// Show only the last N records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Arguments for the transpile command.
#[derive(Debug, Parser)]
pub struct TranspileArgs {
    /// Authoring clause file (JSON)
    pub file: PathBuf,

    /// Accept unknown operators
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Pipeline configuration file
        #[arg(long = "pipeline-config")]
        pipeline_config: Option<PathBuf>,
        /// Workspace id
        #[arg(short, long)]
        workspace: Option<String>,
        /// Data directory
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["adjudica", "run", "CLM-1", "CLM-2", "-j", "8"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.claim_ids, vec!["CLM-1", "CLM-2"]);
                assert_eq!(args.concurrency, Some(8));
                assert!(!args.all);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_all_conflicts_with_ids() {
        assert!(Cli::try_parse_from(["adjudica", "run", "--all", "CLM-1"]).is_err());
    }

    #[test]
    fn test_evaluate_overrides() {
        let cli = Cli::parse_from([
            "adjudica",
            "evaluate",
            "CLM-1",
            "--facts",
            "facts.json",
            "-o",
            "claim.incident.date=null",
            "--override",
            "vehicle.odometer_km=91000",
        ]);
        match cli.command {
            Command::Evaluate(args) => assert_eq!(args.overrides.len(), 2),
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_ledger_show_with_global_flags() {
        let cli = Cli::parse_from(["adjudica", "ledger", "show", "--claim", "CLM-1", "--format", "json", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(
            cli.command,
            Command::Ledger(LedgerArgs {
                action: LedgerAction::Show { claim: Some(_), limit: None }
            })
        ));
    }
}
