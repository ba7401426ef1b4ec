//! Multipart upload collection, validation, and persistence

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::Multipart;
use dossier_domain::{RecordId, StoredFile};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Extensions accepted on any uploaded file
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "png", "jpg", "jpeg", "doc", "docx", "txt"];

/// A file field pulled out of a multipart body
pub struct UploadedFile {
    /// Client-supplied filename, unsanitized
    pub filename: String,
    /// Content type reported for the part, if any
    pub content_type: Option<String>,
    /// Raw file bytes
    pub bytes: Bytes,
}

/// Drain a multipart body into file fields and plain form fields
///
/// A file part with an empty filename counts as absent, matching how
/// browsers submit an empty file input.
pub async fn collect_multipart(
    multipart: &mut Multipart,
) -> Result<(BTreeMap<String, UploadedFile>, BTreeMap<String, String>), ApiError> {
    let mut files = BTreeMap::new();
    let mut form = BTreeMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        match filename {
            Some(filename) if !filename.is_empty() => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                debug!("Received file field '{}' ({} bytes)", name, bytes.len());
                files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    },
                );
            }
            // Empty filename: submitted but not filled in; treat as absent
            Some(_) => {
                let _ = field.bytes().await;
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                form.insert(name, value);
            }
        }
    }

    Ok((files, form))
}

/// Whether the filename carries an allowed extension
pub fn extension_allowed(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reject any required file whose extension is not allowed
pub fn validate_extensions(
    required: &[&str],
    files: &BTreeMap<String, UploadedFile>,
) -> Result<(), ApiError> {
    for key in required {
        if let Some(file) = files.get(*key) {
            if !extension_allowed(&file.filename) {
                return Err(ApiError::InvalidFileType {
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Require every expected file key to be present
pub fn validate_required(
    required: &[&str],
    files: &BTreeMap<String, UploadedFile>,
) -> Result<(), ApiError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !files.contains_key(**key))
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingFiles {
            missing,
            required: required.iter().map(|key| key.to_string()).collect(),
        })
    }
}

/// Strip path components and shell-hostile characters from a filename
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();
    let cleaned = cleaned.trim().replace(' ', "_");

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Persist validated files under the upload directory
///
/// Saved names are prefixed with the record id and file key so repeated
/// uploads of the same filename never collide.
pub async fn save_files(
    upload_dir: &Path,
    id: RecordId,
    required: &[&str],
    mut files: BTreeMap<String, UploadedFile>,
) -> Result<BTreeMap<String, StoredFile>, ApiError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let mut stored = BTreeMap::new();
    for key in required {
        let Some(file) = files.remove(*key) else {
            continue;
        };
        let filename = sanitize_filename(&file.filename);
        let path = upload_dir.join(format!("{}_{}_{}", id, key, filename));
        tokio::fs::write(&path, &file.bytes).await?;
        stored.insert(
            key.to_string(),
            StoredFile::new(filename, path, file.content_type),
        );
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filename: &str) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            content_type: None,
            bytes: Bytes::from_static(b"data"),
        }
    }

    #[test]
    fn test_extension_allowed() {
        assert!(extension_allowed("transcript.pdf"));
        assert!(extension_allowed("Scan.JPEG"));
        assert!(!extension_allowed("tool.exe"));
        assert!(!extension_allowed("no_extension"));
    }

    #[test]
    fn test_validate_required_lists_exactly_missing() {
        let mut files = BTreeMap::new();
        files.insert("transcript".to_string(), file("t.pdf"));

        let err = validate_required(&["transcript", "resume", "ielts_score"], &files).unwrap_err();
        match err {
            ApiError::MissingFiles { missing, required } => {
                assert_eq!(missing, vec!["resume", "ielts_score"]);
                assert_eq!(required.len(), 3);
            }
            other => panic!("Expected MissingFiles, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_extensions_flags_offending_key() {
        let mut files = BTreeMap::new();
        files.insert("transcript".to_string(), file("t.pdf"));
        files.insert("resume".to_string(), file("resume.exe"));

        let err = validate_extensions(&["transcript", "resume"], &files).unwrap_err();
        match err {
            ApiError::InvalidFileType { key } => assert_eq!(key, "resume"),
            other => panic!("Expected InvalidFileType, got {:?}", other),
        }
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename("my resume (final).pdf"), "my_resume_final.pdf");
        assert_eq!(sanitize_filename("///"), "upload");
    }

    #[tokio::test]
    async fn test_save_files_prefixes_record_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let id = RecordId::new();
        let mut files = BTreeMap::new();
        files.insert("transcript".to_string(), file("t.pdf"));

        let stored = save_files(dir.path(), id, &["transcript"], files)
            .await
            .unwrap();
        let saved = &stored["transcript"];
        assert_eq!(saved.filename, "t.pdf");
        assert!(saved
            .storage_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(&id.to_string()));
        assert!(saved.storage_path.exists());
    }
}
