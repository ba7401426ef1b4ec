//! Gemini REST client
//!
//! Talks to the `generateContent` endpoint of the Google Generative
//! Language API. The prompt and the assembled document text travel as two
//! parts of a single user turn, matching how the extraction prompts are
//! written.

use crate::{GenerationConfig, GenerativeClient, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable the API key is read from
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default timeout for generation requests
///
/// Extraction responses over multi-page transcripts can take a while; this
/// is deliberately generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini API client
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// Fails fast with [`LlmError::MissingApiKey`] when the key is empty,
    /// so a misconfigured deployment is caught at startup rather than on
    /// the first request.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client,
        })
    }

    /// Create a client from `GEMINI_API_KEY`, using the default base URL
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| LlmError::MissingApiKey)?;
        Self::new(api_key, DEFAULT_BASE_URL)
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        content: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart {
                        text: prompt.to_string(),
                    },
                    RequestPart {
                        text: content.to_string(),
                    },
                ],
            }],
            generation_config: WireGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| LlmError::Api {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        })?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }
}
