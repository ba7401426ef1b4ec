//! Plain-text reads with a legacy-encoding fallback chain

use std::io;
use std::path::Path;

/// Encoding labels tried, in order, when the file is not valid UTF-8
///
/// Labels resolve through the WHATWG registry, which spells Latin-1
/// without the hyphen.
const FALLBACK_ENCODINGS: [&str; 3] = ["latin1", "iso-8859-1", "cp1252"];

/// Read a file as text
///
/// UTF-8 first; on invalid UTF-8, each fallback encoding is tried in order
/// and the first clean decode wins. Returns an empty string when every
/// decode reports errors.
pub fn extract(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            for label in FALLBACK_ENCODINGS {
                let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) else {
                    continue;
                };
                let (text, _, had_errors) = encoding.decode(&bytes);
                if !had_errors {
                    return Ok(text.into_owned());
                }
            }
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello 世界").unwrap();
        assert_eq!(extract(&path).unwrap(), "hello 世界");
    }

    #[test]
    fn test_latin1_bytes_decode_non_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("b.txt");
        std::fs::write(&path, b"r\xe9sum\xe9").unwrap();
        let text = extract(&path).unwrap();
        assert_eq!(text, "résumé");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(extract(Path::new("/nonexistent.txt")).is_err());
    }
}
