//! Extracted and reconciled facts

use crate::FactProvenance;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single field produced by the external extractor for one document run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Field name (e.g., "policy_start_date", "odometer_km")
    pub name: String,

    /// Raw value as extracted
    pub value: Value,

    /// Extractor-supplied normalized form, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<Value>,

    /// Extraction confidence [0.0, 1.0]
    pub confidence: f64,

    /// Page the value was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Verbatim supporting text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,

    /// Character offsets of the quote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<(usize, usize)>,
}

impl ExtractedField {
    /// Create a field with no location details
    pub fn new(name: impl Into<String>, value: Value, confidence: f64) -> Self {
        Self {
            name: name.into(),
            value,
            normalized_value: None,
            confidence,
            page: None,
            quote: None,
            offsets: None,
        }
    }

    /// Attach an extractor-supplied normalized value
    pub fn with_normalized(mut self, normalized: Value) -> Self {
        self.normalized_value = Some(normalized);
        self
    }

    /// Attach a page number
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a supporting quote
    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }
}

/// All fields extracted from one document in one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    /// Document identifier
    pub doc_id: String,

    /// Document classification
    pub doc_type: String,

    /// Extraction run identifier; later runs sort greater
    pub run_id: String,

    /// Extracted fields
    #[serde(default)]
    pub fields: Vec<ExtractedField>,
}

impl DocumentExtraction {
    /// Create an empty extraction for a document run
    pub fn new(doc_id: impl Into<String>, doc_type: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            doc_type: doc_type.into(),
            run_id: run_id.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, field: ExtractedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the provenance entry for one of this document's fields
    pub fn provenance_for(&self, field: &ExtractedField) -> FactProvenance {
        FactProvenance {
            doc_id: self.doc_id.clone(),
            doc_type: self.doc_type.clone(),
            run_id: self.run_id.clone(),
            page: field.page,
            quote: field.quote.clone(),
            offsets: field.offsets,
        }
    }
}

/// The winning value for one fact name after reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFact {
    /// Fact name
    pub name: String,

    /// Selected raw value
    pub value: Value,

    /// Normalized form used for conflict detection
    pub normalized_value: Value,

    /// Confidence of the selected candidate
    pub confidence: f64,

    /// Where the selected value came from
    pub provenance: FactProvenance,

    /// Number of candidates considered for this name
    #[serde(default)]
    pub candidate_count: usize,
}

/// The canonical fact set for a claim (persisted as `claim_facts.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimFacts {
    /// Claim identifier
    pub claim_id: String,

    /// Reconciled facts, sorted by name
    pub facts: Vec<AggregatedFact>,
}

impl ClaimFacts {
    /// Create a fact set
    pub fn new(claim_id: impl Into<String>, mut facts: Vec<AggregatedFact>) -> Self {
        facts.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            claim_id: claim_id.into(),
            facts,
        }
    }

    /// Build a fact set from plain values, e.g. for re-evaluation or tests.
    ///
    /// Each fact gets confidence 1.0 and a synthetic provenance.
    pub fn from_values(claim_id: impl Into<String>, values: BTreeMap<String, Value>) -> Self {
        let facts = values
            .into_iter()
            .map(|(name, value)| AggregatedFact {
                normalized_value: value.clone(),
                name,
                value,
                confidence: 1.0,
                provenance: FactProvenance::new("manual", "manual", "manual"),
                candidate_count: 1,
            })
            .collect();
        Self::new(claim_id, facts)
    }

    /// Look up a fact by name
    pub fn get(&self, name: &str) -> Option<&AggregatedFact> {
        self.facts.iter().find(|f| f.name == name)
    }

    /// Look up a fact's selected value by name
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|f| &f.value)
    }

    /// Number of facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the set holds no facts
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Flatten to `name -> value`, the input shape of the claim data mapper
    pub fn to_flat_map(&self) -> BTreeMap<String, Value> {
        self.facts
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    /// Mean confidence across all facts, or `None` when empty
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.facts.is_empty() {
            return None;
        }
        Some(self.facts.iter().map(|f| f.confidence).sum::<f64>() / self.facts.len() as f64)
    }
}
