//! Per-claim artifact files
//!
//! Inputs are overwritten on every run; decision artifacts are versioned and
//! never overwritten.
//!
//! ```text
//! <root>/claims/<claim_id>/
//!   claim_facts.json                 (overwrite)
//!   reconciliation_report.json       (overwrite)
//!   screening_v{N}.json              (exclusive create)
//!   screening.json                   (latest copy)
//!   decision_dossier_v{N}.json       (exclusive create)
//!   confidence_summary_v{N}.json     (exclusive create)
//!   confidence_summary.json          (latest copy)
//! ```

use crate::sources::path_component;
use crate::PipelineError;
use adjudica_domain::{ClaimFacts, ConfidenceSummary, Dossier, ReconciliationReport, ScreeningResult};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reconciled facts file name
pub const FACTS_FILE: &str = "claim_facts.json";
/// Reconciliation report file name
pub const REPORT_FILE: &str = "reconciliation_report.json";
/// Latest screening copy
pub const SCREENING_FILE: &str = "screening.json";
/// Latest confidence copy
pub const CONFIDENCE_FILE: &str = "confidence_summary.json";

const DOSSIER_PREFIX: &str = "decision_dossier_v";

/// Writes and reads claim artifacts under `<root>/claims/<claim_id>/`
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at a data directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory of one claim
    pub fn claim_dir(&self, claim_id: &str) -> Result<PathBuf, PipelineError> {
        Ok(self.root.join("claims").join(path_component("claim", claim_id)?))
    }

    /// Overwrite `claim_facts.json`
    pub fn write_facts(&self, facts: &ClaimFacts) -> Result<String, PipelineError> {
        self.replace(&facts.claim_id, FACTS_FILE, facts)
    }

    /// Overwrite `reconciliation_report.json`
    pub fn write_report(&self, report: &ReconciliationReport) -> Result<String, PipelineError> {
        self.replace(&report.claim_id, REPORT_FILE, report)
    }

    /// Create `screening_v{N}.json` and refresh `screening.json`
    pub fn write_screening(&self, screening: &ScreeningResult, version: u32) -> Result<String, PipelineError> {
        let name = format!("screening_v{}.json", version);
        self.create(&screening.claim_id, &name, screening)?;
        self.replace(&screening.claim_id, SCREENING_FILE, screening)?;
        Ok(name)
    }

    /// Create `decision_dossier_v{N}.json` for the dossier's version
    pub fn write_dossier(&self, dossier: &Dossier) -> Result<String, PipelineError> {
        let name = dossier_file(dossier.version);
        self.create(&dossier.claim_id, &name, dossier)?;
        Ok(name)
    }

    /// Create `confidence_summary_v{N}.json` and refresh `confidence_summary.json`
    pub fn write_confidence(&self, summary: &ConfidenceSummary, version: u32) -> Result<String, PipelineError> {
        let name = format!("confidence_summary_v{}.json", version);
        self.create(&summary.claim_id, &name, summary)?;
        self.replace(&summary.claim_id, CONFIDENCE_FILE, summary)?;
        Ok(name)
    }

    /// Dossier versions present for a claim, ascending
    pub fn dossier_versions(&self, claim_id: &str) -> Result<Vec<u32>, PipelineError> {
        let entries = match fs::read_dir(self.claim_dir(claim_id)?) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(version) = name
                .strip_prefix(DOSSIER_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|n| n.parse::<u32>().ok())
            {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    /// Version the next dossier of a claim will get
    pub fn next_version(&self, claim_id: &str) -> Result<u32, PipelineError> {
        Ok(self.dossier_versions(claim_id)?.last().map_or(1, |v| v + 1))
    }

    /// Read one dossier version
    pub fn read_dossier(&self, claim_id: &str, version: u32) -> Result<Dossier, PipelineError> {
        let path = self.claim_dir(claim_id)?.join(dossier_file(version));
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read the highest dossier version, if any
    pub fn latest_dossier(&self, claim_id: &str) -> Result<Option<Dossier>, PipelineError> {
        match self.dossier_versions(claim_id)?.last() {
            Some(&version) => self.read_dossier(claim_id, version).map(Some),
            None => Ok(None),
        }
    }

    /// Write through a temp file and rename over the target
    fn replace<T: Serialize>(&self, claim_id: &str, name: &str, value: &T) -> Result<String, PipelineError> {
        let dir = self.claim_dir(claim_id)?;
        let tmp = self.write_temp(&dir, name, value)?;
        fs::rename(&tmp, dir.join(name))?;
        debug!(claim_id, file = name, "Wrote artifact");
        Ok(name.to_string())
    }

    /// Write through a temp file and link it into place; fails if the target exists
    fn create<T: Serialize>(&self, claim_id: &str, name: &str, value: &T) -> Result<String, PipelineError> {
        let dir = self.claim_dir(claim_id)?;
        let tmp = self.write_temp(&dir, name, value)?;
        let linked = fs::hard_link(&tmp, dir.join(name));
        let _ = fs::remove_file(&tmp);
        match linked {
            Ok(()) => {
                debug!(claim_id, file = name, "Created artifact");
                Ok(name.to_string())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(PipelineError::Artifact(format!(
                "{} already exists for claim {}",
                name, claim_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn write_temp<T: Serialize>(&self, dir: &Path, name: &str, value: &T) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(dir)?;
        let tmp = dir.join(format!(".{}.{}.tmp", name, std::process::id()));
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(value)?)?;
        file.sync_all()?;
        Ok(tmp)
    }
}

fn dossier_file(version: u32) -> String {
    format!("{}{}.json", DOSSIER_PREFIX, version)
}
