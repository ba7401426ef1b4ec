//! Image OCR via Tesseract

use std::path::Path;
use thiserror::Error;

/// Languages passed to Tesseract: English plus Simplified Chinese, since
/// uploaded certificates and score reports mix both.
const OCR_LANGUAGES: &str = "eng+chi_sim";

/// Errors from the OCR pipeline
#[derive(Error, Debug)]
pub enum OcrError {
    /// The image could not be decoded
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// Tesseract was unavailable or errored
    #[error("tesseract failed: {0}")]
    Tesseract(String),
}

/// Run OCR over an image file and return the recognized text, trimmed
pub fn extract(path: &Path) -> Result<String, OcrError> {
    let dynamic = image::open(path)?;
    let image = rusty_tesseract::Image::from_dynamic_image(&dynamic)
        .map_err(|e| OcrError::Tesseract(e.to_string()))?;

    let args = rusty_tesseract::Args {
        lang: OCR_LANGUAGES.to_string(),
        ..rusty_tesseract::Args::default()
    };

    let text = rusty_tesseract::image_to_string(&image, &args)
        .map_err(|e| OcrError::Tesseract(e.to_string()))?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_image_is_decode_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(extract(&path), Err(OcrError::Image(_))));
    }
}
