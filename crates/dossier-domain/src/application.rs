//! Application records - an uploaded dossier tracked through analysis

use crate::file::StoredFile;
use crate::id::RecordId;
use crate::status::RecordStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A student application: uploaded documents plus analysis results
///
/// Invariant: `status` is `Completed` if and only if both `analysis_result`
/// and `structured_summary` are set; `Failed` implies `error_message` is
/// set. The mutators below are the only way the server crates move a record
/// through its lifecycle, and they preserve both properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Unique identifier, assigned at creation
    pub id: RecordId,

    /// Uploaded files keyed by their logical role (e.g. `transcript`)
    pub files: BTreeMap<String, StoredFile>,

    /// Current lifecycle status
    pub status: RecordStatus,

    /// Structured result returned by the model, absent before analysis
    pub analysis_result: Option<Value>,

    /// Rendered Markdown summary, absent before completion
    pub structured_summary: Option<String>,

    /// Failure cause, set only when `status` is `Failed`
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Create a new record for a completed upload
    ///
    /// The id is generated by the route layer so that saved files can be
    /// prefixed with it before the record exists.
    pub fn new(id: RecordId, files: BTreeMap<String, StoredFile>) -> Self {
        let now = Utc::now();
        Self {
            id,
            files,
            status: RecordStatus::Uploaded,
            analysis_result: None,
            structured_summary: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Mark the record as being analyzed
    pub fn begin_analysis(&mut self) {
        self.status = RecordStatus::Analyzing;
    }

    /// Store the structured analysis result and advance to `Analyzed`
    pub fn record_analysis(&mut self, result: Value) {
        self.analysis_result = Some(result);
        self.status = RecordStatus::Analyzed;
    }

    /// Store the rendered summary and advance to `Completed`
    ///
    /// Only advances when an analysis result is already present, keeping
    /// the completed-implies-both invariant intact.
    pub fn record_summary(&mut self, summary: String) {
        self.structured_summary = Some(summary);
        if self.analysis_result.is_some() {
            self.status = RecordStatus::Completed;
        }
    }

    /// Mark the record failed with a cause
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status = RecordStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> BTreeMap<String, StoredFile> {
        let mut files = BTreeMap::new();
        files.insert(
            "transcript".to_string(),
            StoredFile::new("t.pdf", "/tmp/t.pdf", Some("application/pdf".into())),
        );
        files
    }

    #[test]
    fn test_new_record_starts_uploaded() {
        let record = ApplicationRecord::new(RecordId::new(), sample_files());
        assert_eq!(record.status, RecordStatus::Uploaded);
        assert!(record.analysis_result.is_none());
        assert!(record.structured_summary.is_none());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_lifecycle_to_completed() {
        let mut record = ApplicationRecord::new(RecordId::new(), sample_files());
        record.begin_analysis();
        assert_eq!(record.status, RecordStatus::Analyzing);
        record.record_analysis(serde_json::json!({"a": 1}));
        assert_eq!(record.status, RecordStatus::Analyzed);
        record.record_summary("# Summary".to_string());
        assert_eq!(record.status, RecordStatus::Completed);
        assert!(record.analysis_result.is_some());
        assert!(record.structured_summary.is_some());
    }

    #[test]
    fn test_summary_without_analysis_does_not_complete() {
        let mut record = ApplicationRecord::new(RecordId::new(), sample_files());
        record.record_summary("premature".to_string());
        assert_ne!(record.status, RecordStatus::Completed);
    }

    #[test]
    fn test_failure_sets_message() {
        let mut record = ApplicationRecord::new(RecordId::new(), sample_files());
        record.record_failure("model unreachable");
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("model unreachable"));
    }
}
