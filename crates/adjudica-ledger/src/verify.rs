//! Chain verification

use crate::hash::{record_hash, HASH_FIELD};
use adjudica_domain::GENESIS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why verification stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Stored `record_hash` differs from the recomputed hash
    HashMismatch,
    /// `previous_hash` does not match the preceding record's hash
    ChainBreak,
    /// Line is not a JSON object with string hash fields
    MalformedRecord,
}

impl FailureKind {
    /// Get the failure kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::HashMismatch => "hash_mismatch",
            FailureKind::ChainBreak => "chain_break",
            FailureKind::MalformedRecord => "malformed_record",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First integrity failure found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Zero-based record index
    pub index: usize,
    /// Failure kind
    pub kind: FailureKind,
    /// Human-readable detail
    pub detail: String,
}

/// Outcome of verifying a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Whether the whole chain is intact
    pub valid: bool,
    /// Records read (up to the failure, inclusive)
    pub total_records: usize,
    /// First failure, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<VerificationFailure>,
}

impl VerificationReport {
    fn failed(index: usize, kind: FailureKind, detail: String) -> Self {
        Self {
            valid: false,
            total_records: index + 1,
            failure: Some(VerificationFailure { index, kind, detail }),
        }
    }
}

/// Verify the non-empty lines of a ledger file, in order
pub(crate) fn verify_lines<'a>(lines: impl Iterator<Item = &'a str>) -> VerificationReport {
    let mut expected_previous = GENESIS.to_string();
    let mut total = 0;

    for (index, line) in lines.enumerate() {
        let record: Value = match serde_json::from_str(line) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) => {
                return VerificationReport::failed(
                    index,
                    FailureKind::MalformedRecord,
                    "record is not a JSON object".to_string(),
                )
            }
            Err(e) => {
                return VerificationReport::failed(index, FailureKind::MalformedRecord, e.to_string())
            }
        };

        let (Some(stored), Some(previous)) = (
            record.get(HASH_FIELD).and_then(Value::as_str),
            record.get("previous_hash").and_then(Value::as_str),
        ) else {
            return VerificationReport::failed(
                index,
                FailureKind::MalformedRecord,
                "missing record_hash or previous_hash".to_string(),
            );
        };

        let computed = record_hash(&record);
        if computed != stored {
            return VerificationReport::failed(
                index,
                FailureKind::HashMismatch,
                format!("stored {}, computed {}", stored, computed),
            );
        }

        if previous != expected_previous {
            return VerificationReport::failed(
                index,
                FailureKind::ChainBreak,
                format!("previous_hash {}, expected {}", previous, expected_previous),
            );
        }

        expected_previous = stored.to_string();
        total += 1;
    }

    VerificationReport {
        valid: true,
        total_records: total,
        failure: None,
    }
}
