//! Shared document-text extraction helpers

use dossier_domain::StoredFile;
use std::collections::BTreeMap;
use tracing::info;

/// Characters kept per field in an error snapshot
const SNAPSHOT_CHARS: usize = 100;

/// Extract text from every uploaded file, keyed like the input
///
/// Extraction is best-effort per file: a file that yields nothing
/// contributes an empty string rather than failing the batch.
pub fn extract_document_texts(files: &BTreeMap<String, StoredFile>) -> BTreeMap<String, String> {
    let mut texts = BTreeMap::new();
    for (key, file) in files {
        let text = dossier_text::extract_text(&file.storage_path, file.content_type.as_deref());
        info!("Extracted {} characters from {}", text.chars().count(), key);
        texts.insert(key.clone(), text);
    }
    texts
}

/// Truncate extracted texts for inclusion in an error payload
pub fn truncate_snapshot(texts: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    texts
        .iter()
        .map(|(key, text)| {
            let snippet = if text.is_empty() {
                String::new()
            } else {
                let mut snippet: String = text.chars().take(SNAPSHOT_CHARS).collect();
                snippet.push_str("...");
                snippet
            };
            (key.clone(), snippet)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_truncates_long_text() {
        let mut texts = BTreeMap::new();
        texts.insert("transcript".to_string(), "x".repeat(500));
        let snapshot = truncate_snapshot(&texts);
        assert_eq!(snapshot["transcript"].chars().count(), 103);
        assert!(snapshot["transcript"].ends_with("..."));
    }

    #[test]
    fn test_snapshot_keeps_empty_text_empty() {
        let mut texts = BTreeMap::new();
        texts.insert("resume".to_string(), String::new());
        let snapshot = truncate_snapshot(&texts);
        assert_eq!(snapshot["resume"], "");
    }

    #[test]
    fn test_snapshot_is_char_safe() {
        let mut texts = BTreeMap::new();
        texts.insert("transcript".to_string(), "成".repeat(200));
        let snapshot = truncate_snapshot(&texts);
        assert!(snapshot["transcript"].ends_with("..."));
    }
}
