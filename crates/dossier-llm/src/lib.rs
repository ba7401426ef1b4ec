//! Dossier LLM Client Layer
//!
//! Pluggable generative-AI clients behind a common trait.
//!
//! # Architecture
//!
//! [`GenerativeClient`] is the seam between the analysis services and the
//! outside world. Two implementations ship here:
//!
//! - [`MockClient`]: deterministic scripted double for testing
//! - [`GeminiClient`]: Google Gemini REST integration
//!
//! Model fallback is an explicit ordered loop over candidate model names
//! ([`GenerativeClient::generate_with_fallback`]): the first model that
//! answers wins, and when every candidate fails the error describes all
//! attempts.
//!
//! # Examples
//!
//! ```
//! use dossier_llm::MockClient;
//!
//! let client = MockClient::new("{\"ok\": true}");
//! client.push_response("scripted");
//! assert_eq!(client.call_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

pub use gemini::GeminiClient;

/// Errors that can occur in the LLM layer
#[derive(Error, Debug)]
pub enum LlmError {
    /// API key absent at construction time
    #[error("GEMINI_API_KEY environment variable is required")]
    MissingApiKey,

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure talking to the API
    #[error("Request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Error body or description
        message: String,
    },

    /// The API answered but returned no usable text
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// Every candidate model failed
    #[error("All candidate models failed: {summary}")]
    AllModelsFailed {
        /// One `model: error` entry per attempt, `; `-joined
        summary: String,
    },
}

/// Sampling configuration sent with every generation request
///
/// Extraction wants near-deterministic output, so both presets pin the
/// temperature and nucleus low and differ only in output budget.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling bound
    pub top_p: f32,
    /// Top-k sampling bound
    pub top_k: u32,
    /// Output token cap
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Preset for application-document analysis
    pub fn application() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 4096,
        }
    }

    /// Preset for transcript verification; larger budget for course tables
    pub fn transcript() -> Self {
        Self {
            max_output_tokens: 8192,
            ..Self::application()
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::application()
    }
}

/// A successful generation: the text plus the model that produced it
#[derive(Debug, Clone)]
pub struct Generation {
    /// Raw response text
    pub text: String,
    /// Identifier of the model that actually answered
    pub model: String,
}

/// Common interface over generative-AI backends
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Issue one generation request against a single named model
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        content: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError>;

    /// Try each candidate model in order, returning the first success
    ///
    /// When every candidate fails, the returned error lists each model
    /// with the failure it produced.
    async fn generate_with_fallback(
        &self,
        models: &[String],
        prompt: &str,
        content: &str,
        config: &GenerationConfig,
    ) -> Result<Generation, LlmError> {
        let mut attempts: Vec<String> = Vec::new();

        for model in models {
            match self.generate(model, prompt, content, config).await {
                Ok(text) => {
                    info!("Model '{}' answered ({} chars)", model, text.len());
                    return Ok(Generation {
                        text,
                        model: model.clone(),
                    });
                }
                Err(e) => {
                    warn!("Model '{}' failed: {}", model, e);
                    attempts.push(format!("{}: {}", model, e));
                }
            }
        }

        let summary = if attempts.is_empty() {
            "no candidate models configured".to_string()
        } else {
            attempts.join("; ")
        };
        Err(LlmError::AllModelsFailed { summary })
    }
}

/// Scripted response for the mock client
type ScriptedResponse = Result<String, String>;

/// Mock client for deterministic testing
///
/// Returns scripted responses in order, then a fixed default once the
/// script runs dry. Records every model name it was called with.
///
/// # Examples
///
/// ```
/// use dossier_llm::MockClient;
///
/// let client = MockClient::new("default");
/// client.push_error("model offline");
/// client.push_response("{\"a\": 1}");
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: String,
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    /// Create a mock with a fixed default response
    pub fn new(default_response: impl Into<String>) -> Self {
        Self {
            default_response: default_response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful response
    pub fn push_response(&self, text: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    /// Model names from every call so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of generate calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl GenerativeClient for MockClient {
    async fn generate(
        &self,
        model: &str,
        _prompt: &str,
        _content: &str,
        _config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(model.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Api {
                status: 500,
                message,
            }),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_default_response() {
        let client = MockClient::new("fixed");
        let config = GenerationConfig::default();
        let text = client.generate("m", "p", "c", &config).await.unwrap();
        assert_eq!(text, "fixed");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_order() {
        let client = MockClient::new("default");
        client.push_response("first");
        client.push_error("boom");
        let config = GenerationConfig::default();

        assert_eq!(client.generate("m", "p", "c", &config).await.unwrap(), "first");
        assert!(client.generate("m", "p", "c", &config).await.is_err());
        assert_eq!(client.generate("m", "p", "c", &config).await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_fallback_first_success_short_circuits() {
        let client = MockClient::new("answer");
        let config = GenerationConfig::default();
        let generation = client
            .generate_with_fallback(&models(&["primary", "secondary"]), "p", "c", &config)
            .await
            .unwrap();
        assert_eq!(generation.text, "answer");
        assert_eq!(generation.model, "primary");
        assert_eq!(client.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_fallback_advances_on_failure() {
        let client = MockClient::new("late answer");
        client.push_error("primary offline");
        let config = GenerationConfig::default();
        let generation = client
            .generate_with_fallback(&models(&["primary", "secondary"]), "p", "c", &config)
            .await
            .unwrap();
        assert_eq!(generation.model, "secondary");
        assert_eq!(client.calls(), vec!["primary", "secondary"]);
    }

    #[tokio::test]
    async fn test_fallback_composes_all_attempts() {
        let client = MockClient::new("unused");
        client.push_error("first down");
        client.push_error("second down");
        let config = GenerationConfig::default();
        let err = client
            .generate_with_fallback(&models(&["a", "b"]), "p", "c", &config)
            .await
            .unwrap_err();

        match err {
            LlmError::AllModelsFailed { summary } => {
                assert!(summary.contains("a:"));
                assert!(summary.contains("first down"));
                assert!(summary.contains("b:"));
                assert!(summary.contains("second down"));
            }
            other => panic!("Expected AllModelsFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_with_no_models() {
        let client = MockClient::new("unused");
        let config = GenerationConfig::default();
        let err = client
            .generate_with_fallback(&[], "p", "c", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AllModelsFailed { .. }));
    }

    #[test]
    fn test_config_presets() {
        let application = GenerationConfig::application();
        assert_eq!(application.max_output_tokens, 4096);
        let transcript = GenerationConfig::transcript();
        assert_eq!(transcript.max_output_tokens, 8192);
        assert_eq!(transcript.temperature, application.temperature);
    }
}
