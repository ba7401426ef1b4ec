//! Error types for the analysis services

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while running an analysis or verification
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The generative model call failed after exhausting every candidate
    ///
    /// Carries a truncated snapshot of whatever document text had already
    /// been extracted, so the caller can surface it for diagnosis.
    #[error("Generative model call failed: {message}")]
    Model {
        /// Description of the failure, covering all attempted models
        message: String,
        /// Per-file extracted text, truncated to 100 characters each
        document_texts: BTreeMap<String, String>,
    },

    /// The service was never configured (missing credential at startup)
    #[error("{0}")]
    Unavailable(String),
}
