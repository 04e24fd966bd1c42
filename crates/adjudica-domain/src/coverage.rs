//! Coverage and processing summaries supplied by upstream collaborators

use serde::{Deserialize, Serialize};

/// Line item category, as classified by the coverage provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Replacement parts
    Parts,
    /// Workshop labor
    Labor,
    /// Fees, consumables and anything else
    Other,
}

/// Whether a line item falls under the policy's coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// Covered by the policy
    Covered,
    /// Explicitly not covered
    NotCovered,
    /// Classification uncertain; needs a reviewer
    Review,
}

/// One invoiced line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item identifier within the claim
    pub item_id: String,
    /// Invoice description
    pub description: String,
    /// Category
    pub category: ItemCategory,
    /// Gross amount
    pub amount: f64,
    /// Coverage classification
    pub status: CoverageStatus,
    /// Classifier confidence [0.0, 1.0]
    #[serde(default = "default_item_confidence")]
    pub confidence: f64,
}

fn default_item_confidence() -> f64 {
    1.0
}

/// Parts/labor coverage classification for a claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Classified line items
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl CoverageSummary {
    /// Sum of all line item amounts
    pub fn claimed_total(&self) -> f64 {
        self.line_items.iter().map(|i| i.amount).sum()
    }

    /// Sum of covered line item amounts
    pub fn covered_total(&self) -> f64 {
        self.total_with_status(CoverageStatus::Covered)
    }

    /// Sum of amounts with the given status
    pub fn total_with_status(&self, status: CoverageStatus) -> f64 {
        self.line_items
            .iter()
            .filter(|i| i.status == status)
            .map(|i| i.amount)
            .sum()
    }

    /// Mean classifier confidence, or `None` without line items
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.line_items.is_empty() {
            return None;
        }
        Some(self.line_items.iter().map(|i| i.confidence).sum::<f64>() / self.line_items.len() as f64)
    }
}

/// Document pipeline statistics for a claim run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Documents in the claim
    pub documents_total: usize,
    /// Documents whose processing failed
    #[serde(default)]
    pub documents_failed: usize,
    /// Mean OCR/extraction quality reported upstream [0.0, 1.0]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_extraction_quality: Option<f64>,
}

impl ProcessingSummary {
    /// Fraction of documents processed successfully, or `None` without documents
    pub fn success_ratio(&self) -> Option<f64> {
        if self.documents_total == 0 {
            return None;
        }
        let ok = self.documents_total.saturating_sub(self.documents_failed);
        Some(ok as f64 / self.documents_total as f64)
    }
}
