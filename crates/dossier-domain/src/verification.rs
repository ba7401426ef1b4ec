//! Transcript verification records

use crate::file::StoredFile;
use crate::id::RecordId;
use crate::status::RecordStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How the transcript documents were uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    /// One bilingual transcript file
    Single,

    /// Separate Chinese and English transcript files
    Separate,
}

impl UploadType {
    /// Get the upload type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadType::Single => "single",
            UploadType::Separate => "separate",
        }
    }

    /// The document-type label recorded in verification metadata
    pub fn document_type(&self) -> &'static str {
        match self {
            UploadType::Single => "bilingual",
            UploadType::Separate => "separate",
        }
    }
}

impl std::str::FromStr for UploadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(UploadType::Single),
            "separate" => Ok(UploadType::Separate),
            other => Err(format!(
                "Invalid upload_type '{}'. Must be \"single\" or \"separate\"",
                other
            )),
        }
    }
}

/// A transcript verification: uploaded transcript files plus results
///
/// Structurally parallel to [`crate::ApplicationRecord`] with verification
/// fields in place of the analysis fields, and no `Pending` initial state.
/// The same status invariants hold: `Completed` iff both results are set,
/// `Failed` implies `error_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Unique identifier, assigned at creation
    pub id: RecordId,

    /// Uploaded files keyed by their logical role
    pub files: BTreeMap<String, StoredFile>,

    /// Whether one bilingual file or two language-specific files were sent
    pub upload_type: UploadType,

    /// Current lifecycle status
    pub status: RecordStatus,

    /// Structured result returned by the model, absent before verification
    pub verification_result: Option<Value>,

    /// Rendered Markdown report, absent before completion
    pub structured_result: Option<String>,

    /// Failure cause, set only when `status` is `Failed`
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Create a new record for a completed transcript upload
    pub fn new(
        id: RecordId,
        files: BTreeMap<String, StoredFile>,
        upload_type: UploadType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            files,
            upload_type,
            status: RecordStatus::Uploaded,
            verification_result: None,
            structured_result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Mark the record as being verified
    pub fn begin_verification(&mut self) {
        self.status = RecordStatus::Analyzing;
    }

    /// Store the structured verification result and advance to `Analyzed`
    pub fn record_verification(&mut self, result: Value) {
        self.verification_result = Some(result);
        self.status = RecordStatus::Analyzed;
    }

    /// Store the rendered report and advance to `Completed`
    pub fn record_report(&mut self, report: String) {
        self.structured_result = Some(report);
        if self.verification_result.is_some() {
            self.status = RecordStatus::Completed;
        }
    }

    /// Mark the record failed with a cause
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status = RecordStatus::Failed;
    }
}
