//! JSONL-backed Decision Ledger

use crate::hash::record_hash;
use crate::verify::{verify_lines, VerificationReport};
use crate::LedgerError;
use adjudica_domain::{DecisionId, DecisionRecord, NewDecision, GENESIS};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use fs2::FileExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default ledger file name
pub const LEDGER_FILE: &str = "decisions.jsonl";

/// Append-only, hash-chained decision ledger stored as one JSON record per line
///
/// Appends take an exclusive OS lock on a `.<file>.lock` sibling, held
/// across reading the tail and replacing the file, so separate handles and
/// separate processes writing the same ledger are serialized. The file is
/// rewritten through a uniquely named temporary sibling that is fsynced and
/// then renamed over the original, so readers see either the old or the new
/// ledger.
///
/// The record hash is computed over the record as it reads back from its
/// serialized line, so verification recomputes the same bytes.
///
/// # Examples
///
/// ```no_run
/// use adjudica_domain::{DecisionType, NewDecision, Rationale};
/// use adjudica_ledger::JsonlLedger;
/// use serde_json::json;
///
/// let ledger = JsonlLedger::open("data/decisions.jsonl").unwrap();
/// let record = ledger
///     .append(NewDecision {
///         decision_type: DecisionType::ClaimVerdict,
///         claim_id: "CLM-1".to_string(),
///         run_id: None,
///         rationale: Rationale {
///             summary: "Approved".to_string(),
///             confidence: 0.9,
///             linked_call_ids: vec![],
///         },
///         outcome: json!({"decision": "APPROVE"}),
///         actor: "system:pipeline".to_string(),
///     })
///     .unwrap();
/// assert!(ledger.verify().unwrap().valid);
/// # let _ = record;
/// ```
#[derive(Debug)]
pub struct JsonlLedger {
    path: PathBuf,
}

impl JsonlLedger {
    /// Open (or prepare to create) a ledger at `path`
    ///
    /// The parent directory is created if needed; the file itself is
    /// created on first append.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "Opened decision ledger");
        Ok(Self { path })
    }

    /// Ledger file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a decision, assigning id, timestamp and chain hashes
    pub fn append(&self, decision: NewDecision) -> Result<DecisionRecord, LedgerError> {
        // Released when the handle is dropped
        let lock = self.lock_file()?;
        lock.lock_exclusive()?;

        let existing = self.read_raw()?;
        let previous_hash = tail_hash(&existing)?;

        let mut record = DecisionRecord {
            decision_id: DecisionId::new(),
            decision_type: decision.decision_type,
            claim_id: decision.claim_id,
            run_id: decision.run_id,
            rationale: decision.rationale,
            outcome: decision.outcome,
            actor: decision.actor,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            record_hash: String::new(),
            previous_hash,
        };
        let unhashed: Value = serde_json::from_str(&serde_json::to_string(&record)?)?;
        record.record_hash = record_hash(&unhashed);

        let mut contents = existing;
        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(&serde_json::to_string(&record)?);
        contents.push('\n');
        self.replace_atomically(contents.as_bytes(), &record.decision_id)?;

        info!(
            decision_id = %record.decision_id,
            claim_id = %record.claim_id,
            decision_type = record.decision_type.as_str(),
            "Appended ledger record"
        );
        Ok(record)
    }

    /// Verify the whole chain
    pub fn verify(&self) -> Result<VerificationReport, LedgerError> {
        let raw = self.read_raw()?;
        let report = verify_lines(non_empty_lines(&raw));
        match &report.failure {
            Some(failure) => warn!(
                index = failure.index,
                kind = failure.kind.as_str(),
                detail = %failure.detail,
                "Ledger verification failed"
            ),
            None => info!(records = report.total_records, "Ledger verified"),
        }
        Ok(report)
    }

    /// All records in ledger order
    pub fn records(&self) -> Result<Vec<DecisionRecord>, LedgerError> {
        let raw = self.read_raw()?;
        non_empty_lines(&raw)
            .map(|line| serde_json::from_str(line).map_err(LedgerError::from))
            .collect()
    }

    /// Records for one claim, in ledger order
    pub fn records_for_claim(&self, claim_id: &str) -> Result<Vec<DecisionRecord>, LedgerError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.claim_id == claim_id)
            .collect())
    }

    /// Most recent record
    pub fn last_record(&self) -> Result<Option<DecisionRecord>, LedgerError> {
        let raw = self.read_raw()?;
        match non_empty_lines(&raw).last() {
            Some(line) => Ok(Some(serde_json::from_str(line)?)),
            None => Ok(None),
        }
    }

    /// Number of records
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(non_empty_lines(&self.read_raw()?).count())
    }

    /// Whether the ledger has no records
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    fn read_raw(&self) -> Result<String, LedgerError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| LEDGER_FILE.to_string())
    }

    fn lock_file(&self) -> Result<File, LedgerError> {
        let lock_path = self.path.with_file_name(format!(".{}.lock", self.file_name()));
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?)
    }

    fn replace_atomically(&self, bytes: &[u8], decision_id: &DecisionId) -> Result<(), LedgerError> {
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", self.file_name(), decision_id));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // Directory fsync is unsupported on some platforms
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

fn non_empty_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|l| !l.trim().is_empty())
}

/// `record_hash` of the last record, or GENESIS for an empty ledger
fn tail_hash(raw: &str) -> Result<String, LedgerError> {
    let Some((index, line)) = non_empty_lines(raw).enumerate().last() else {
        return Ok(GENESIS.to_string());
    };
    let value: Value = serde_json::from_str(line).map_err(|e| LedgerError::Corrupt {
        line: index,
        reason: e.to_string(),
    })?;
    value
        .get("record_hash")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LedgerError::Corrupt {
            line: index,
            reason: "last record has no record_hash".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjudica_domain::{DecisionType, Rationale};
    use serde_json::json;

    fn decision(claim_id: &str) -> NewDecision {
        NewDecision {
            decision_type: DecisionType::ClaimVerdict,
            claim_id: claim_id.to_string(),
            run_id: Some("run-1".to_string()),
            rationale: Rationale {
                summary: "ok".to_string(),
                confidence: 0.8,
                linked_call_ids: vec![],
            },
            outcome: json!({"decision": "APPROVE"}),
            actor: "system:test".to_string(),
        }
    }

    #[test]
    fn test_first_record_links_to_genesis() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonlLedger::open(dir.path().join(LEDGER_FILE)).unwrap();

        let record = ledger.append(decision("C-1")).unwrap();
        assert_eq!(record.previous_hash, GENESIS);
        assert_eq!(record.record_hash.len(), 64);
        assert!(record.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_unrepresentable_confidence_still_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonlLedger::open(dir.path().join(LEDGER_FILE)).unwrap();

        for confidence in [0.9856906946328695, 0.5, 0.7, 1.0 / 3.0, 2.2250738585072014e-308] {
            let mut next = decision("C-1");
            next.rationale.confidence = confidence;
            next.outcome = json!({"decision": "APPROVE", "net_payable": confidence * 1234.56});
            ledger.append(next).unwrap();
        }

        let report = ledger.verify().unwrap();
        assert!(report.valid, "{:?}", report.failure);
        assert_eq!(report.total_records, 5);
    }

    #[test]
    fn test_two_handles_share_one_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE);

        let writers: Vec<_> = (0..2)
            .map(|w| {
                let ledger = JsonlLedger::open(&path).unwrap();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        ledger.append(decision(&format!("C-{}-{}", w, i))).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let ledger = JsonlLedger::open(&path).unwrap();
        assert_eq!(ledger.len().unwrap(), 20);
        assert!(ledger.verify().unwrap().valid);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit").join(LEDGER_FILE);
        let ledger = JsonlLedger::open(&path).unwrap();
        assert!(ledger.is_empty().unwrap());
        ledger.append(decision("C-1")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_append_refuses_corrupt_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE);
        fs::write(&path, "{broken\n").unwrap();

        let ledger = JsonlLedger::open(&path).unwrap();
        assert!(matches!(
            ledger.append(decision("C-1")),
            Err(LedgerError::Corrupt { line: 0, .. })
        ));
    }
}
