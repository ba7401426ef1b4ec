//! Dossier Analysis Services
//!
//! The two extraction services at the heart of the system:
//!
//! - [`ApplicationAnalysisService`]: turns a set of uploaded application
//!   documents into a structured result and a Markdown summary
//! - [`TranscriptVerificationService`]: same shape for academic
//!   transcripts, with an ordered model-fallback chain and a `metadata`
//!   stamp on every successful parse
//!
//! Both follow the same pipeline: extract text per document (best-effort,
//! never failing the batch), assemble one prompt body with fixed section
//! headers, call the model, and recover JSON from the free-text response.
//! A response that fails to decode is absorbed into a `{raw_response,
//! error}` payload; only an outright model failure surfaces as an error.
//!
//! Service availability is decided once at startup: a missing credential
//! yields the [`ServiceHandle::Unavailable`] variant, which answers every
//! call with a fixed explanatory error instead of panicking or retrying.

#![warn(missing_docs)]

pub mod application;
pub mod documents;
pub mod error;
pub mod fields;
pub mod parser;
pub mod prompt;
pub mod transcript;

pub use application::{render_summary, ApplicationAnalysisService};
pub use error::AnalysisError;
pub use parser::{parse_model_response, ParsedResponse};
pub use transcript::{render_transcript_report, TranscriptVerificationService};

/// A service slot filled at startup: either a working service or the
/// reason it could not be constructed
///
/// Both variants answer the same calls; the unavailable arm reports its
/// fixed reason for every request instead of failing at call time in
/// surprising ways.
pub enum ServiceHandle<S> {
    /// The service was constructed successfully
    Available(S),

    /// Construction failed; `reason` explains why on every call
    Unavailable {
        /// Fixed explanatory error reported for every call
        reason: String,
    },
}

impl<S> ServiceHandle<S> {
    /// Wrap a constructed service
    pub fn available(service: S) -> Self {
        ServiceHandle::Available(service)
    }

    /// Record a construction failure
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ServiceHandle::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether a real service is behind this handle
    pub fn is_available(&self) -> bool {
        matches!(self, ServiceHandle::Available(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_availability() {
        let available: ServiceHandle<()> = ServiceHandle::available(());
        assert!(available.is_available());

        let unavailable: ServiceHandle<()> = ServiceHandle::unavailable("no key");
        assert!(!unavailable.is_available());
        match unavailable {
            ServiceHandle::Unavailable { reason } => assert_eq!(reason, "no key"),
            ServiceHandle::Available(_) => panic!("Expected unavailable"),
        }
    }
}
