//! Dossier Text Extraction
//!
//! Best-effort plain-text extraction from uploaded documents. One entry
//! point, [`extract_text`], dispatches on filename extension (then on a
//! content-type hint) to a format-specific backend:
//!
//! - PDF: fast structural pass via `lopdf`, layout-aware retry via
//!   `pdf-extract` when the structural pass comes back thin
//! - DOC/DOCX: paragraph concatenation via `docx-rs` (feature `docx`)
//! - TXT: UTF-8 with a fixed legacy-encoding fallback chain
//! - Images: bilingual English + Simplified Chinese OCR via Tesseract
//!   (feature `ocr`)
//!
//! Extraction never fails the caller: every backend error is logged and
//! degrades to an empty string, and each optional backend is independently
//! absent-tolerant via its cargo feature.

#![warn(missing_docs)]

use std::path::Path;
use tracing::{debug, warn};

mod pdf;
mod plain;

#[cfg(feature = "docx")]
mod docx;

#[cfg(feature = "ocr")]
mod ocr;

/// Image extensions routed to the OCR backend
const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".tif"];

/// Extensions this crate can extract text from
const SUPPORTED_EXTENSIONS: [&str; 10] = [
    ".pdf", ".docx", ".doc", ".txt", ".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".tif",
];

/// Whether the filename carries an extension some backend understands
pub fn is_supported(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Extract text from any supported file type
///
/// Dispatches on the lowercase filename extension; unknown extensions fall
/// back to substring sniffing of the content-type hint (`pdf`,
/// `word`/`document`, `text`, `image`) and finally to a plain-text read.
/// Returns an empty string on any failure; errors are only logged.
pub fn extract_text(path: &Path, content_type: Option<&str>) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".pdf") {
        return pdf_text(path);
    }
    if name.ends_with(".docx") || name.ends_with(".doc") {
        return docx_text(path);
    }
    if name.ends_with(".txt") {
        return plain_text(path);
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return image_text(path);
    }

    // Unknown extension: sniff the content-type hint
    if let Some(content_type) = content_type {
        if content_type.contains("pdf") {
            return pdf_text(path);
        } else if content_type.contains("word") || content_type.contains("document") {
            return docx_text(path);
        } else if content_type.contains("text") {
            return plain_text(path);
        } else if content_type.contains("image") {
            return image_text(path);
        }
    }

    // Last resort: try it as a text file
    plain_text(path)
}

/// Character count below which the structural PDF pass is considered thin
const PDF_THIN_TEXT_CHARS: usize = 100;

fn pdf_text(path: &Path) -> String {
    let mut text = match pdf::extract_structural(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Structural PDF extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    };

    // Scanned or oddly-encoded PDFs often defeat the structural reader;
    // retry with the layout-aware reader and prefer its output if non-empty.
    if text.trim().chars().count() < PDF_THIN_TEXT_CHARS {
        match pdf::extract_layout(path) {
            Ok(layout) if !layout.trim().is_empty() => text = layout,
            Ok(_) => {}
            Err(e) => {
                warn!("Layout PDF extraction failed for {}: {}", path.display(), e);
            }
        }
    }

    text.trim().to_string()
}

#[cfg(feature = "docx")]
fn docx_text(path: &Path) -> String {
    match docx::extract(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("DOCX extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(not(feature = "docx"))]
fn docx_text(path: &Path) -> String {
    warn!(
        "DOCX support not compiled in; returning empty text for {}",
        path.display()
    );
    String::new()
}

#[cfg(feature = "ocr")]
fn image_text(path: &Path) -> String {
    match ocr::extract(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("OCR extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn image_text(path: &Path) -> String {
    warn!(
        "OCR support not compiled in; returning empty text for {}",
        path.display()
    );
    String::new()
}

fn plain_text(path: &Path) -> String {
    match plain::extract(path) {
        Ok(text) => {
            debug!("Read {} chars of plain text from {}", text.chars().count(), path.display());
            text
        }
        Err(e) => {
            warn!("Plain-text read failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}
