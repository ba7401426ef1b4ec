//! Parse model output into structured results
//!
//! Models are instructed to answer with pure JSON but routinely wrap it in
//! a Markdown code fence. Parsing therefore peels a ` ```json ` fence
//! first, then any fence, then falls back to the raw text, and a response
//! that still fails to decode is absorbed into an error payload rather
//! than surfaced as a failure.

use serde_json::{json, Value};
use tracing::warn;

/// Error marker stored in the payload when decoding fails
pub const PARSE_ERROR_MESSAGE: &str = "Failed to parse JSON response";

/// Outcome of parsing a model response
#[derive(Debug)]
pub enum ParsedResponse {
    /// The response decoded as JSON
    Structured(Value),

    /// The response did not decode; `payload` holds the raw-text fallback
    Unparsed {
        /// `{ "raw_response": …, "error": … }` fallback payload
        payload: Value,
        /// The underlying decode error
        error: String,
    },
}

impl ParsedResponse {
    /// Collapse into a result value, structured or fallback
    pub fn into_value(self) -> Value {
        match self {
            ParsedResponse::Structured(value) => value,
            ParsedResponse::Unparsed { payload, .. } => payload,
        }
    }

    /// Whether the response decoded as JSON
    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedResponse::Structured(_))
    }
}

/// Parse a model response, recovering JSON from Markdown fences
pub fn parse_model_response(response: &str) -> ParsedResponse {
    let trimmed = response.trim();
    let json_str = extract_json_block(trimmed);

    match serde_json::from_str::<Value>(json_str) {
        Ok(value) => ParsedResponse::Structured(value),
        Err(e) => {
            warn!("Failed to parse JSON response: {}", e);
            ParsedResponse::Unparsed {
                payload: json!({
                    "raw_response": trimmed,
                    "error": PARSE_ERROR_MESSAGE,
                }),
                error: e.to_string(),
            }
        }
    }
}

/// Extract the JSON candidate from a response
///
/// A fence labeled `json` wins; otherwise the first fenced block of any
/// kind; otherwise the text as-is. An unterminated fence yields everything
/// after the opening marker.
fn extract_json_block(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + "```json".len()..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some(start) = text.find("```") {
        let rest = &text[start + "```".len()..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    text
}
