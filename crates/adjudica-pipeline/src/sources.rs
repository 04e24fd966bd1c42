//! Directory-backed claim inputs
//!
//! ```text
//! <root>/claims/<claim_id>/extractions/<doc_id>/<run_id>.json
//! <root>/claims/<claim_id>/coverage_summary.json
//! <root>/claims/<claim_id>/processing_summary.json
//! ```

use crate::PipelineError;
use adjudica_domain::{CoverageProvider, CoverageSummary, DocumentExtraction, FactSource, ProcessingSummary};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Coverage summary file name
pub const COVERAGE_FILE: &str = "coverage_summary.json";
/// Processing summary file name
pub const PROCESSING_FILE: &str = "processing_summary.json";

/// Fact and coverage source usable behind one trait object
pub trait ClaimSource:
    FactSource<Error = PipelineError> + CoverageProvider<Error = PipelineError> + Send + Sync
{
}

impl<T> ClaimSource for T where
    T: FactSource<Error = PipelineError> + CoverageProvider<Error = PipelineError> + Send + Sync
{
}

/// Reads extraction runs and summaries from a data directory
#[derive(Debug, Clone)]
pub struct FsFactSource {
    root: PathBuf,
}

impl FsFactSource {
    /// Source rooted at a data directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding one claim's inputs and artifacts
    pub fn claim_dir(&self, claim_id: &str) -> Result<PathBuf, PipelineError> {
        Ok(self.root.join("claims").join(path_component("claim", claim_id)?))
    }

    fn extractions_dir(&self, claim_id: &str) -> Result<PathBuf, PipelineError> {
        Ok(self.claim_dir(claim_id)?.join("extractions"))
    }

    /// Claim ids with a directory under `claims/`, sorted
    pub fn list_claims(&self) -> Result<Vec<String>, PipelineError> {
        list_entries(&self.root.join("claims"), EntryKind::Dir)
    }
}

/// `id` if it names exactly one entry inside its parent directory
pub(crate) fn path_component<'a>(kind: &str, id: &'a str) -> Result<&'a str, PipelineError> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(PipelineError::InvalidId(format!("{} id {:?}", kind, id)));
    }
    Ok(id)
}

#[derive(Clone, Copy)]
enum EntryKind {
    Dir,
    Json,
}

/// Sorted entry names of a directory; a missing directory is empty
fn list_entries(dir: &Path, kind: EntryKind) -> Result<Vec<String>, PipelineError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = match kind {
            EntryKind::Dir if path.is_dir() => entry.file_name().to_string_lossy().into_owned(),
            EntryKind::Json if path.extension().is_some_and(|e| e == "json") => match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            },
            _ => continue,
        };
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PipelineError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text).map_err(|e| {
            PipelineError::Source(format!("{}: {}", path.display(), e))
        })?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl FactSource for FsFactSource {
    type Error = PipelineError;

    fn list_documents(&self, claim_id: &str) -> Result<Vec<String>, PipelineError> {
        list_entries(&self.extractions_dir(claim_id)?, EntryKind::Dir)
    }

    fn list_runs(&self, claim_id: &str, doc_id: &str) -> Result<Vec<String>, PipelineError> {
        let dir = self.extractions_dir(claim_id)?.join(path_component("document", doc_id)?);
        list_entries(&dir, EntryKind::Json)
    }

    fn read_extraction(
        &self,
        claim_id: &str,
        doc_id: &str,
        run_id: &str,
    ) -> Result<DocumentExtraction, PipelineError> {
        let path = self
            .extractions_dir(claim_id)?
            .join(path_component("document", doc_id)?)
            .join(format!("{}.json", path_component("run", run_id)?));
        debug!(path = %path.display(), "Reading extraction");
        read_optional(&path)?
            .ok_or_else(|| PipelineError::Source(format!("missing extraction {}", path.display())))
    }
}

impl CoverageProvider for FsFactSource {
    type Error = PipelineError;

    fn coverage_summary(&self, claim_id: &str) -> Result<Option<CoverageSummary>, PipelineError> {
        read_optional(&self.claim_dir(claim_id)?.join(COVERAGE_FILE))
    }

    fn processing_summary(&self, claim_id: &str) -> Result<Option<ProcessingSummary>, PipelineError> {
        read_optional(&self.claim_dir(claim_id)?.join(PROCESSING_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: PathBuf, value: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, value.to_string()).unwrap();
    }

    fn extraction(doc: &str, run: &str, odometer: u64) -> serde_json::Value {
        json!({
            "doc_id": doc,
            "doc_type": "service_invoice",
            "run_id": run,
            "fields": [{"name": "odometer_km", "value": odometer, "confidence": 0.9}]
        })
    }

    #[test]
    fn test_latest_run_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsFactSource::new(dir.path());
        let base = source.claim_dir("CLM-1").unwrap().join("extractions");
        write(base.join("invoice").join("20250101.json"), extraction("invoice", "20250101", 80_000));
        write(base.join("invoice").join("20250301.json"), extraction("invoice", "20250301", 91_000));
        write(base.join("policy").join("20250101.json"), extraction("policy", "20250101", 90_500));

        assert_eq!(source.list_documents("CLM-1").unwrap(), vec!["invoice", "policy"]);
        assert_eq!(source.list_claims().unwrap(), vec!["CLM-1"]);

        let latest = source.latest_extractions("CLM-1").unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].run_id, "20250301");
        assert_eq!(latest[0].fields[0].value, json!(91_000));
    }

    #[test]
    fn test_missing_claim_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsFactSource::new(dir.path());
        assert!(source.latest_extractions("nope").unwrap().is_empty());
        assert!(source.coverage_summary("nope").unwrap().is_none());
        assert!(source.processing_summary("nope").unwrap().is_none());
    }

    #[test]
    fn test_malformed_summary_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsFactSource::new(dir.path());
        let claim_dir = source.claim_dir("CLM-1").unwrap();
        fs::create_dir_all(&claim_dir).unwrap();
        fs::write(claim_dir.join(COVERAGE_FILE), "{not json").unwrap();
        assert!(matches!(
            source.coverage_summary("CLM-1"),
            Err(PipelineError::Source(_))
        ));
    }

    #[test]
    fn test_path_escaping_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsFactSource::new(dir.path().join("data"));
        fs::create_dir_all(dir.path().join("outside")).unwrap();
        fs::write(dir.path().join("outside").join(COVERAGE_FILE), "{}").unwrap();

        for claim_id in ["../../outside", "..", ".", "", "a/b", "a\\b", "/etc"] {
            assert!(
                matches!(source.claim_dir(claim_id), Err(PipelineError::InvalidId(_))),
                "accepted {:?}",
                claim_id
            );
            assert!(source.coverage_summary(claim_id).is_err());
            assert!(source.latest_extractions(claim_id).is_err());
        }
        assert!(source.list_runs("CLM-1", "../x").is_err());
        assert!(source.read_extraction("CLM-1", "invoice", "../../run").is_err());
    }

    #[test]
    fn test_dotted_ids_accepted() {
        assert_eq!(path_component("claim", "CLM-2025.06.01").unwrap(), "CLM-2025.06.01");
        assert!(path_component("claim", "..hidden").is_ok());
    }
}
