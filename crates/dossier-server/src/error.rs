//! API error responses
//!
//! Every error leaves the server as a JSON envelope with a stable `code`
//! so clients can branch without string-matching messages. Validation
//! errors and unknown ids are the only 4xx responses; backend failures
//! during analysis are recorded on the record and returned as 500.

use crate::upload::ALLOWED_EXTENSIONS;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::collections::BTreeMap;

/// Application error type for the route layer
#[derive(Debug)]
pub enum ApiError {
    /// One or more required file keys absent from the upload
    MissingFiles {
        /// Keys that were absent or had an empty filename
        missing: Vec<String>,
        /// Full required-key set for this operation
        required: Vec<String>,
    },

    /// A required file arrived with a disallowed extension
    InvalidFileType {
        /// The offending file key
        key: String,
    },

    /// The `upload_type` form field was not a recognized value
    InvalidUploadType {
        /// Explanation including the accepted values
        message: String,
    },

    /// The multipart body could not be read
    BadRequest(String),

    /// No record under the requested id
    NotFound(&'static str),

    /// Analysis or verification failed on the backend
    AnalysisFailed {
        /// Failure description, also recorded on the record
        message: String,
        /// Truncated extracted-text snapshot, when one was captured
        document_texts: Option<BTreeMap<String, String>>,
    },

    /// Internal server error
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingFiles { missing, required } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Missing required files",
                    "code": "MISSING_FILES",
                    "missing_files": missing,
                    "required_files": required,
                }),
            ),
            ApiError::InvalidFileType { key } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": format!("File type not allowed for {}", key),
                    "code": "INVALID_FILE_TYPE",
                    "allowed_extensions": ALLOWED_EXTENSIONS,
                }),
            ),
            ApiError::InvalidUploadType { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "code": "INVALID_UPLOAD_TYPE",
                }),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "code": "INVALID_REQUEST",
                }),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": message,
                    "code": "NOT_FOUND",
                }),
            ),
            ApiError::AnalysisFailed {
                message,
                document_texts,
            } => {
                let mut body = json!({
                    "error": message,
                    "code": "ANALYSIS_FAILED",
                });
                if let Some(texts) = document_texts {
                    body["document_texts"] = json!(texts);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": message,
                    "code": "INTERNAL",
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(format!("I/O error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_status() {
        let response = ApiError::MissingFiles {
            missing: vec!["resume".to_string()],
            required: vec!["transcript".to_string(), "resume".to_string()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("Application not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_analysis_failed_status() {
        let response = ApiError::AnalysisFailed {
            message: "all models down".to_string(),
            document_texts: None,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
