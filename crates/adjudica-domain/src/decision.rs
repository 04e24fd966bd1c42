//! Decision records - the unit of the audit ledger

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Sentinel used as `previous_hash` of the first ledger record
pub const GENESIS: &str = "GENESIS";

/// Unique identifier for a decision based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability matching ledger order
/// - 128-bit uniqueness
/// - No coordination required between workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionId(u128);

impl DecisionId {
    /// Generate a new UUIDv7-based DecisionId
    ///
    /// # Examples
    ///
    /// ```
    /// use adjudica_domain::DecisionId;
    ///
    /// let id = DecisionId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DecisionId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DecisionId from a UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use adjudica_domain::DecisionId;
    ///
    /// let id = DecisionId::new();
    /// let parsed = DecisionId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Get the timestamp component of the UUIDv7 (milliseconds since Unix epoch)
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for DecisionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DecisionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DecisionId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Final verdict on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimVerdict {
    /// Pay the claim
    Approve,
    /// Deny the claim
    Reject,
    /// Send to a human reviewer
    Refer,
}

impl ClaimVerdict {
    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimVerdict::Approve => "APPROVE",
            ClaimVerdict::Reject => "REJECT",
            ClaimVerdict::Refer => "REFER",
        }
    }
}

impl fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of decision recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Automated claim verdict (screening or rules)
    ClaimVerdict,
    /// Re-evaluation with overridden assumptions
    Reevaluation,
    /// A reviewer's manual decision
    HumanOverride,
}

impl DecisionType {
    /// Get the decision type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::ClaimVerdict => "claim_verdict",
            DecisionType::Reevaluation => "reevaluation",
            DecisionType::HumanOverride => "human_override",
        }
    }
}

/// Why a decision was made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    /// One-paragraph explanation
    pub summary: String,
    /// Composite confidence at decision time [0.0, 1.0]
    pub confidence: f64,
    /// Ids of upstream calls or artifacts supporting the decision
    #[serde(default)]
    pub linked_call_ids: Vec<String>,
}

/// A decision about to be appended; the ledger assigns id, timestamp and hashes
#[derive(Debug, Clone, PartialEq)]
pub struct NewDecision {
    /// Decision kind
    pub decision_type: DecisionType,
    /// Claim identifier
    pub claim_id: String,
    /// Claim run the decision derives from
    pub run_id: Option<String>,
    /// Why
    pub rationale: Rationale,
    /// Type-specific payload (e.g. `{"decision": "REJECT", ...}`)
    pub outcome: Value,
    /// Who or what made the decision (e.g. "system:pipeline", "user:alice")
    pub actor: String,
}

/// An immutable, hash-chained ledger record
///
/// Invariants:
/// - record 0 has `previous_hash == GENESIS`
/// - record i > 0 has `previous_hash == record_hash(i - 1)`
/// - `record_hash` is the hash of the canonical serialization of every other field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Unique id
    pub decision_id: DecisionId,
    /// Decision kind
    pub decision_type: DecisionType,
    /// Claim identifier
    pub claim_id: String,
    /// Claim run identifier
    #[serde(default)]
    pub run_id: Option<String>,
    /// Why
    pub rationale: Rationale,
    /// Type-specific payload
    pub outcome: Value,
    /// Who or what decided
    pub actor: String,
    /// RFC 3339 UTC timestamp with microsecond precision
    pub timestamp: String,
    /// Hex SHA-256 of the canonical record content
    pub record_hash: String,
    /// `record_hash` of the preceding record, or `GENESIS`
    pub previous_hash: String,
}

impl DecisionRecord {
    /// The `decision` field of the outcome payload, if present
    pub fn outcome_decision(&self) -> Option<&str> {
        self.outcome.get("decision").and_then(Value::as_str)
    }
}
