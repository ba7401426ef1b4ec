//! Dossier Server
//!
//! HTTP route layer for the student-application document pipeline:
//! multipart upload, record lifecycle sequencing, and the two analysis
//! flows, served over axum.
//!
//! Records live only in process memory (see `dossier-store`); restarting
//! the server discards them. That limitation is part of the service's
//! contract, not an oversight.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod upload;

use config::ServerConfig;
use dossier_analysis::{ApplicationAnalysisService, ServiceHandle, TranscriptVerificationService};
use dossier_llm::gemini::API_KEY_ENV;
use dossier_llm::GeminiClient;
use dossier_store::RecordStore;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Construct both analysis services from the environment
///
/// The credential is checked once here: with a usable key both services
/// share one client; without one, both handles carry the explanation and
/// report it on every call, while uploads keep working.
pub fn build_services(
    config: &ServerConfig,
) -> (
    ServiceHandle<ApplicationAnalysisService>,
    ServiceHandle<TranscriptVerificationService>,
) {
    let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();

    match GeminiClient::new(api_key, &config.gemini_base_url) {
        Ok(client) => {
            let client = Arc::new(client);
            (
                ServiceHandle::available(ApplicationAnalysisService::new(
                    client.clone(),
                    config.application_models.clone(),
                )),
                ServiceHandle::available(TranscriptVerificationService::new(
                    client,
                    config.transcript_models.clone(),
                )),
            )
        }
        Err(e) => {
            warn!("Failed to initialize generative client: {}", e);
            warn!("File upload will work, but analysis requires {}", API_KEY_ENV);
            let reason = format!(
                "Generative AI service not initialized: {}. Set the {} environment variable.",
                e, API_KEY_ENV
            );
            (
                ServiceHandle::unavailable(reason.clone()),
                ServiceHandle::unavailable(reason),
            )
        }
    }
}

/// Start the HTTP server
///
/// Initializes tracing, builds the services and record store, and serves
/// until the process exits.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Dossier server");
    info!("Bind address: {}", config.bind_addr());
    info!("Upload directory: {}", config.upload_dir.display());
    info!(
        "Application models: {}; transcript models: {}",
        config.application_models.join(", "),
        config.transcript_models.join(", ")
    );

    let (application_service, transcript_service) = build_services(&config);
    if !application_service.is_available() {
        warn!("Analysis endpoints will report a configuration error");
    }

    let state = AppState {
        store: RecordStore::new(),
        application_service: Arc::new(application_service),
        transcript_service: Arc::new(transcript_service),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_services_without_key_is_unavailable() {
        // The test environment has no API key configured
        std::env::remove_var(API_KEY_ENV);
        let config = ServerConfig::default();
        let (application, transcript) = build_services(&config);
        assert!(!application.is_available());
        assert!(!transcript.is_available());
    }
}
