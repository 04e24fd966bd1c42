//! Adjudica CLI - Command-line interface for the claim decision pipeline.

use adjudica_cli::commands::{self, Workspace};
use adjudica_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Log to stderr so table and JSON output stay clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> adjudica_cli::Result<()> {
    // Load or create config
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default CLI configuration: {}", e);
        Config::default()
    });

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Profile(args) => commands::execute_profile(args, &mut config, &formatter),
        Command::Transpile(args) => commands::execute_transpile(args, &formatter),
        cmd => {
            // Commands that need an open workspace
            let pipeline_config = config.pipeline_config(cli.config.as_deref())?;
            let workspace = Workspace::open(pipeline_config)?;

            match cmd {
                Command::Run(args) => commands::execute_run(args, &workspace, &formatter).await,
                Command::Evaluate(args) => {
                    commands::execute_evaluate(args, &workspace, &formatter)
                }
                Command::Ledger(args) => {
                    commands::execute_ledger(args, &workspace.ledger, &formatter)
                }
                Command::Profile(_) | Command::Transpile(_) => unreachable!(),
            }
        }
    }
}
