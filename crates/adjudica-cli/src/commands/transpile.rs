//! Transpile command implementation.

use crate::cli::TranspileArgs;
use crate::error::Result;
use crate::output::Formatter;
use adjudica_domain::ClauseSet;
use adjudica_rules::transpile_clause_set;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Execute the transpile command.
pub fn execute_transpile(args: TranspileArgs, formatter: &Formatter) -> Result<()> {
    let clause_set = compile(&args.file, !args.no_validate)?;
    println!("{}", formatter.format_clause_set(&clause_set)?);
    Ok(())
}

fn compile(path: &Path, validate: bool) -> Result<ClauseSet> {
    let authoring: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(transpile_clause_set(&authoring, validate)?)
}
