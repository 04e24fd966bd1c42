//! Evaluate command implementation.

use super::{parse_as_of, Workspace};
use crate::cli::EvaluateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use adjudica_domain::{ClaimFacts, CoverageSummary, Dossier};
use adjudica_screening::CheckContext;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Execute the evaluate command.
pub fn execute_evaluate(args: EvaluateArgs, workspace: &Workspace, formatter: &Formatter) -> Result<()> {
    let dossier = evaluate(args, workspace)?;
    println!("{}", formatter.format_dossier(&dossier)?);
    Ok(())
}

fn evaluate(args: EvaluateArgs, workspace: &Workspace) -> Result<Dossier> {
    let as_of = parse_as_of(args.as_of.as_deref())?;
    let facts = read_facts(&args.claim_id, &args.facts)?;
    let coverage: Option<CoverageSummary> = match &args.coverage {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };
    let overrides = parse_overrides(&args.overrides)?;

    let screening = if args.no_screening {
        None
    } else {
        let plugin = workspace.registry.get(&workspace.config.workspace_id)?;
        let engine = plugin.screening_engine(&workspace.config.screening);
        let mut ctx = CheckContext::new(&args.claim_id, &facts, as_of);
        if let Some(coverage) = &coverage {
            ctx = ctx.with_coverage(coverage);
        }
        Some(engine.screen(&ctx))
    };

    let service = workspace.builder().service()?;
    Ok(service.evaluate(
        &args.claim_id,
        &facts,
        screening.as_ref(),
        coverage.as_ref(),
        None,
        Some(&overrides),
    )?)
}

/// Read a JSON object of fact name to value.
fn read_facts(claim_id: &str, path: &Path) -> Result<ClaimFacts> {
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let Value::Object(map) = value else {
        return Err(CliError::InvalidInput(format!(
            "{}: expected a JSON object of fact values",
            path.display()
        )));
    };
    Ok(ClaimFacts::from_values(claim_id, map.into_iter().collect()))
}

/// Parse `NAME=VALUE` overrides; values that are not JSON are taken as strings.
fn parse_overrides(raw: &[String]) -> Result<BTreeMap<String, Value>> {
    let mut overrides = BTreeMap::new();
    for item in raw {
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| CliError::InvalidInput(format!("override '{}' is not NAME=VALUE", item)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::InvalidInput(format!("override '{}' has no name", item)));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        overrides.insert(name.to_string(), value);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjudica_domain::{ClaimVerdict, DecidedBy};
    use adjudica_pipeline::AdjudicaConfig;
    use serde_json::json;

    #[test]
    fn test_parse_overrides() {
        let overrides = parse_overrides(&[
            "odometer_km=91000".to_string(),
            "usage=private".to_string(),
            "incident_date=null".to_string(),
        ])
        .unwrap();
        assert_eq!(overrides["odometer_km"], json!(91000));
        assert_eq!(overrides["usage"], json!("private"));
        assert_eq!(overrides["incident_date"], Value::Null);

        assert!(parse_overrides(&["no-equals".to_string()]).is_err());
        assert!(parse_overrides(&["=1".to_string()]).is_err());
    }

    #[test]
    fn test_evaluate_from_facts_file() {
        let dir = tempfile::tempdir().unwrap();
        let facts_path = dir.path().join("facts.json");
        fs::write(
            &facts_path,
            json!({
                "policy_number": "MW-2025-0042",
                "policy_start_date": "2025-01-01",
                "vin": "WVWZZZ1JZXW000001",
                "odometer_km": 412000,
                "claim_amount": 2000
            })
            .to_string(),
        )
        .unwrap();

        let workspace = Workspace::open(AdjudicaConfig {
            data_dir: dir.path().join("data"),
            ..Default::default()
        })
        .unwrap();
        let args = |no_screening| EvaluateArgs {
            claim_id: "CLM-9".to_string(),
            facts: facts_path.clone(),
            coverage: None,
            overrides: Vec::new(),
            no_screening,
            as_of: Some("2025-06-01".to_string()),
        };

        let screened = evaluate(args(false), &workspace).unwrap();
        assert_eq!(screened.verdict, ClaimVerdict::Reject);
        assert_eq!(screened.decided_by, DecidedBy::Screening);
        assert_eq!(screened.version, 1);

        let unscreened = evaluate(args(true), &workspace).unwrap();
        assert_eq!(unscreened.decided_by, DecidedBy::Rules);
        assert_eq!(unscreened.version, 2);
        assert_eq!(workspace.ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_facts_must_be_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(read_facts("CLM-1", &path), Err(CliError::InvalidInput(_))));
    }
}
