//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use adjudica_domain::{ClaimVerdict, ClauseSet, DecisionRecord, Dossier};
use adjudica_ledger::VerificationReport;
use adjudica_pipeline::{BatchReport, StageStatus};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a pipeline run.
    pub fn format_batch(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(report
                .claims
                .iter()
                .map(|c| {
                    let outcome = c.verdict.map(|v| v.as_str()).unwrap_or(c.status.as_str());
                    format!("{}\t{}", c.claim_id, outcome)
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if report.claims.is_empty() {
                    return Ok(self.colorize("No claims processed.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Claim", "Status", "Verdict", "Version", "Time (ms)", "Detail"]);
                for claim in &report.claims {
                    let verdict = claim
                        .verdict
                        .map(|v| self.verdict(v))
                        .unwrap_or_else(|| "-".to_string());
                    let version = claim
                        .dossier_version
                        .map(|v| format!("v{}", v))
                        .unwrap_or_else(|| "-".to_string());
                    builder.push_record([
                        claim.claim_id.clone(),
                        self.status(claim.status),
                        verdict,
                        version,
                        claim.elapsed_ms.to_string(),
                        claim.error.clone().unwrap_or_default(),
                    ]);
                }

                Ok(format!("{}\n{}", self.table(builder), report.metrics.summary()))
            }
        }
    }

    /// Format a decision dossier.
    pub fn format_dossier(&self, dossier: &Dossier) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(dossier)?),
            OutputFormat::Quiet => Ok(format!("{}\t{}", dossier.claim_id, dossier.verdict)),
            OutputFormat::Table => {
                let mut out = format!(
                    "{} v{}: {} (decided by {})\n{}\n",
                    dossier.claim_id,
                    dossier.version,
                    self.verdict(dossier.verdict),
                    match dossier.decided_by {
                        adjudica_domain::DecidedBy::Screening => "screening",
                        adjudica_domain::DecidedBy::Rules => "rules",
                    },
                    dossier.summary
                );

                if !dossier.hard_fails.is_empty() {
                    out.push_str(&format!("Hard fails: {}\n", dossier.hard_fails.join(", ")));
                }

                if !dossier.clauses.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Clause", "Type", "Verdict", "Reasoning"]);
                    for clause in dossier.clauses.iter() {
                        builder.push_record([
                            clause.clause_id.clone(),
                            clause.clause_type.as_str().to_string(),
                            clause.verdict.as_str().to_string(),
                            clause.reasoning.clone(),
                        ]);
                    }
                    out.push_str(&self.table(builder));
                    out.push('\n');
                }

                if let Some(summary) = &dossier.financial_summary {
                    out.push_str(&format!(
                        "Claimed {:.2} {}, covered {:.2}, payable {:.2}\n",
                        summary.claimed_total,
                        summary.currency,
                        summary.covered_total,
                        summary.net_payable
                    ));
                }

                if let Some(confidence) = &dossier.confidence {
                    out.push_str(&format!(
                        "Confidence: {:.2} ({})\n",
                        confidence.composite_score,
                        confidence.band.as_str()
                    ));
                }

                Ok(out.trim_end().to_string())
            }
        }
    }

    /// Format ledger records.
    pub fn format_records(&self, records: &[DecisionRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.decision_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No decisions recorded.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Decision", "Claim", "Type", "Outcome", "Actor", "Timestamp", "Hash"]);
                for record in records {
                    builder.push_record([
                        record.decision_id.to_string(),
                        record.claim_id.clone(),
                        record.decision_type.as_str().to_string(),
                        record.outcome_decision().unwrap_or("-").to_string(),
                        record.actor.clone(),
                        record.timestamp.clone(),
                        record.record_hash.chars().take(12).collect(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a ledger verification report.
    pub fn format_verification(&self, report: &VerificationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(if report.valid { "valid" } else { "invalid" }.to_string()),
            OutputFormat::Table => Ok(match &report.failure {
                None => self.success(&format!("Ledger intact ({} record(s))", report.total_records)),
                Some(failure) => self.error(&format!(
                    "{} at record {}: {}",
                    failure.kind, failure.index, failure.detail
                )),
            }),
        }
    }

    /// Format a canonical clause set.
    pub fn format_clause_set(&self, clause_set: &ClauseSet) -> Result<String> {
        match self.format {
            OutputFormat::Quiet => Ok(clause_set
                .clauses
                .iter()
                .map(|c| c.clause_id.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            _ => Ok(serde_json::to_string_pretty(clause_set)?),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn verdict(&self, verdict: ClaimVerdict) -> String {
        let color = match verdict {
            ClaimVerdict::Approve => "green",
            ClaimVerdict::Reject => "red",
            ClaimVerdict::Refer => "yellow",
        };
        self.colorize(verdict.as_str(), color)
    }

    fn status(&self, status: StageStatus) -> String {
        let color = match status {
            StageStatus::Success => "green",
            StageStatus::Error => "red",
            _ => "cyan",
        };
        self.colorize(status.as_str(), color)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
