//! Dossier Server CLI
//!
//! Starts the HTTP server for the student-application document pipeline.

use dossier_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServerConfig::from_file(config_path)?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServerConfig::default()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Dossier Server - Student Application Document Analysis");
    println!();
    println!("USAGE:");
    println!("    dossier-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    GEMINI_API_KEY     API key for the generative model.");
    println!("                       Without it the server starts, but analysis");
    println!("                       endpoints report a configuration error.");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (default '0.0.0.0')");
    println!("    - bind_port: Port number (default 5000)");
    println!("    - upload_dir: Directory for uploaded files (default 'uploads')");
    println!("    - gemini_base_url: Generative API base URL");
    println!("    - application_models: Candidate models for analysis");
    println!("    - transcript_models: Candidate models for verification");
    println!();
}
