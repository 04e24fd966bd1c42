//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between decisioning logic and the
//! upstream document pipeline. Implementations live in other crates.

use crate::{compare_run_ids, CoverageSummary, DocumentExtraction, ProcessingSummary};

/// Reads per-document extraction results for a claim
///
/// Implemented by the infrastructure layer (adjudica-pipeline)
pub trait FactSource {
    /// Error type for read operations
    type Error;

    /// List document ids that have at least one extraction run
    fn list_documents(&self, claim_id: &str) -> Result<Vec<String>, Self::Error>;

    /// List extraction run ids for a document, in any order
    fn list_runs(&self, claim_id: &str, doc_id: &str) -> Result<Vec<String>, Self::Error>;

    /// Read one extraction run
    fn read_extraction(
        &self,
        claim_id: &str,
        doc_id: &str,
        run_id: &str,
    ) -> Result<DocumentExtraction, Self::Error>;

    /// Read the most recent run of every document, ordered by [`compare_run_ids`]
    fn latest_extractions(&self, claim_id: &str) -> Result<Vec<DocumentExtraction>, Self::Error> {
        let mut extractions = Vec::new();
        for doc_id in self.list_documents(claim_id)? {
            let runs = self.list_runs(claim_id, &doc_id)?;
            if let Some(latest) = runs.iter().max_by(|a, b| compare_run_ids(a, b)) {
                extractions.push(self.read_extraction(claim_id, &doc_id, latest)?);
            }
        }
        Ok(extractions)
    }
}

/// Supplies parts/labor coverage classification and processing statistics
///
/// Implemented by the infrastructure layer (adjudica-pipeline)
pub trait CoverageProvider {
    /// Error type for read operations
    type Error;

    /// Coverage summary for a claim, if one was produced
    fn coverage_summary(&self, claim_id: &str) -> Result<Option<CoverageSummary>, Self::Error>;

    /// Processing summary for a claim, if one was produced
    fn processing_summary(&self, _claim_id: &str) -> Result<Option<ProcessingSummary>, Self::Error> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct MemorySource {
        runs: BTreeMap<String, Vec<DocumentExtraction>>,
    }

    impl FactSource for MemorySource {
        type Error = String;

        fn list_documents(&self, _claim_id: &str) -> Result<Vec<String>, String> {
            Ok(self.runs.keys().cloned().collect())
        }

        fn list_runs(&self, _claim_id: &str, doc_id: &str) -> Result<Vec<String>, String> {
            Ok(self.runs[doc_id].iter().map(|e| e.run_id.clone()).collect())
        }

        fn read_extraction(
            &self,
            _claim_id: &str,
            doc_id: &str,
            run_id: &str,
        ) -> Result<DocumentExtraction, String> {
            self.runs[doc_id]
                .iter()
                .find(|e| e.run_id == run_id)
                .cloned()
                .ok_or_else(|| format!("no run {}", run_id))
        }
    }

    #[test]
    fn test_latest_extractions_picks_greatest_run() {
        let mut runs = BTreeMap::new();
        runs.insert(
            "doc-1".to_string(),
            vec![
                DocumentExtraction::new("doc-1", "invoice", "run-002"),
                DocumentExtraction::new("doc-1", "invoice", "run-010"),
                DocumentExtraction::new("doc-1", "invoice", "run-001"),
            ],
        );
        let source = MemorySource { runs };

        let latest = source.latest_extractions("CLM-1").unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].run_id, "run-010");
    }

    #[test]
    fn test_latest_extractions_orders_unpadded_runs_numerically() {
        let mut runs = BTreeMap::new();
        runs.insert(
            "doc-1".to_string(),
            vec![
                DocumentExtraction::new("doc-1", "invoice", "run-9"),
                DocumentExtraction::new("doc-1", "invoice", "run-10"),
            ],
        );
        let source = MemorySource { runs };

        let latest = source.latest_extractions("CLM-1").unwrap();
        assert_eq!(latest[0].run_id, "run-10");
    }
}
