//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, upload directory, the
//! generative API base URL, and the candidate model lists for each flow.
//! The API key itself always comes from the environment, never from a
//! config file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Directory uploaded files are saved under
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Base URL of the generative API
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Candidate models for application analysis, in fallback order
    #[serde(default = "default_application_models")]
    pub application_models: Vec<String>,

    /// Candidate models for transcript verification, in fallback order
    #[serde(default = "default_transcript_models")]
    pub transcript_models: Vec<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    5000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_gemini_base_url() -> String {
    dossier_llm::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_application_models() -> Vec<String> {
    vec!["gemini-pro".to_string()]
}

fn default_transcript_models() -> Vec<String> {
    vec![
        "gemini-3-pro-preview".to_string(),
        "gemini-2.5-pro".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            upload_dir: default_upload_dir(),
            gemini_base_url: default_gemini_base_url(),
            application_models: default_application_models(),
            transcript_models: default_transcript_models(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_port, 5000);
        assert_eq!(config.application_models, vec!["gemini-pro"]);
        assert_eq!(config.transcript_models.len(), 2);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 9000
            upload_dir = "/var/dossier/uploads"
            transcript_models = ["custom-model"]
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.upload_dir, PathBuf::from("/var/dossier/uploads"));
        assert_eq!(config.transcript_models, vec!["custom-model"]);
        // Unspecified fields keep their defaults
        assert_eq!(config.application_models, vec!["gemini-pro"]);
    }
}
