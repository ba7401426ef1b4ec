//! DOCX paragraph extraction

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use std::path::Path;
use thiserror::Error;

/// Errors from the DOCX reader
#[derive(Error, Debug)]
pub enum DocxError {
    /// Could not read the file
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Not a well-formed DOCX archive
    #[error("parse failed: {0}")]
    Parse(String),
}

/// Extract paragraph text from a Word document, one paragraph per line
pub fn extract(path: &Path) -> Result<String, DocxError> {
    let bytes = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| DocxError::Parse(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for para_child in &paragraph.children {
                if let ParagraphChild::Run(run) = para_child {
                    for run_child in &run.children {
                        if let RunChild::Text(text) = run_child {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            paragraphs.push(line);
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_archive_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.docx");
        std::fs::write(&path, b"plain bytes").unwrap();
        assert!(matches!(extract(&path), Err(DocxError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            extract(Path::new("/nonexistent.docx")),
            Err(DocxError::Io(_))
        ));
    }
}
