//! Run command implementation.

use super::{parse_as_of, Workspace};
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use adjudica_pipeline::{BatchReport, BatchWorker, ClaimContext};
use tracing::info;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, workspace: &Workspace, formatter: &Formatter) -> Result<()> {
    let report = run_claims(args, workspace).await?;
    println!("{}", formatter.format_batch(&report)?);

    match report.error_count() {
        0 => Ok(()),
        n => Err(CliError::ClaimsFailed(n)),
    }
}

async fn run_claims(args: RunArgs, workspace: &Workspace) -> Result<BatchReport> {
    let as_of = parse_as_of(args.as_of.as_deref())?;

    let claim_ids = if args.all {
        workspace.source.list_claims()?
    } else if args.claim_ids.is_empty() {
        return Err(CliError::InvalidInput(
            "Specify claim ids or --all".to_string(),
        ));
    } else {
        args.claim_ids
    };
    info!("Running {} claim(s) in workspace {}", claim_ids.len(), workspace.config.workspace_id);

    let mut worker = BatchWorker::new(workspace.builder());
    if let Some(concurrency) = args.concurrency {
        worker = worker.with_concurrency(concurrency);
    }

    let claims = claim_ids
        .into_iter()
        .map(|id| ClaimContext::new(id).with_as_of(as_of))
        .collect();
    Ok(worker.run(claims).await?)
}
