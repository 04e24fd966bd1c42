//! Ledger command implementation.

use crate::cli::{LedgerAction, LedgerArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use adjudica_domain::DecisionRecord;
use adjudica_ledger::JsonlLedger;

/// Execute the ledger command.
pub fn execute_ledger(args: LedgerArgs, ledger: &JsonlLedger, formatter: &Formatter) -> Result<()> {
    match args.action {
        LedgerAction::Verify => {
            let report = ledger.verify()?;
            println!("{}", formatter.format_verification(&report)?);
            match report.failure {
                None => Ok(()),
                Some(failure) => Err(CliError::Tampered(format!(
                    "{} at record {}",
                    failure.kind, failure.index
                ))),
            }
        }
        LedgerAction::Show { claim, limit } => {
            let records = select_records(ledger, claim.as_deref(), limit)?;
            println!("{}", formatter.format_records(&records)?);
            Ok(())
        }
    }
}

/// Records in append order, optionally for one claim, keeping the last `limit`.
fn select_records(
    ledger: &JsonlLedger,
    claim: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<DecisionRecord>> {
    let mut records = match claim {
        Some(claim_id) => ledger.records_for_claim(claim_id)?,
        None => ledger.records()?,
    };
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    Ok(records)
}
