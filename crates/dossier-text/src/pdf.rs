//! PDF text extraction: structural pass plus layout-aware retry

use std::path::Path;
use thiserror::Error;

/// Errors from either PDF reader
#[derive(Error, Debug)]
pub enum PdfError {
    /// `lopdf` failed to load or walk the document
    #[error("structural reader: {0}")]
    Structural(#[from] lopdf::Error),

    /// `pdf-extract` failed to render text
    #[error("layout reader: {0}")]
    Layout(#[from] pdf_extract::OutputError),
}

/// Fast structural extraction: walk the page tree and pull content streams
pub fn extract_structural(path: &Path) -> Result<String, PdfError> {
    let document = lopdf::Document::load(path)?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();

    let mut text = String::new();
    for page in pages {
        // A page with a malformed content stream should not sink the rest
        match document.extract_text(&[page]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                tracing::debug!("Skipping page {}: {}", page, e);
            }
        }
    }

    Ok(text)
}

/// Layout-aware extraction, slower but better on column/table-heavy pages
pub fn extract_layout(path: &Path) -> Result<String, PdfError> {
    Ok(pdf_extract::extract_text(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_rejects_non_pdf() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"%NOT-A-PDF").unwrap();
        assert!(extract_structural(&path).is_err());
    }

    #[test]
    fn test_layout_rejects_missing_file() {
        assert!(extract_layout(Path::new("/nonexistent.pdf")).is_err());
    }
}
