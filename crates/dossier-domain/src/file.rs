//! Uploaded file references

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reference to an uploaded file persisted on disk
///
/// The record keeps the client-supplied filename for display, the path the
/// route layer saved the bytes under, and the multipart content type when
/// the client sent one (used as an extraction hint for extension-less
/// uploads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Sanitized client-supplied filename
    pub filename: String,

    /// Path the file was saved under
    pub storage_path: PathBuf,

    /// Content type reported by the client, if any
    pub content_type: Option<String>,
}

impl StoredFile {
    /// Create a new stored-file reference
    pub fn new(
        filename: impl Into<String>,
        storage_path: impl Into<PathBuf>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            storage_path: storage_path.into(),
            content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let file = StoredFile::new(
            "transcript.pdf",
            "/tmp/uploads/abc_transcript.pdf",
            Some("application/pdf".to_string()),
        );
        let json = serde_json::to_string(&file).unwrap();
        let parsed: StoredFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, file);
    }
}
