use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crpt_api::config::{Config, LogFormat};
use crpt_api::document::Document;
use crpt_api::error::Result;
use crpt_api::CrptApi;

fn init_tracing(config: &Config) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run(config: Config) -> Result<()> {
    let api = CrptApi::from_config(&config)?;

    let document = Document::sample();
    api.create_document(&document, &config.signature).await?;

    api.stats().log_stats();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);
    info!("Submitting sample document to {}", config.endpoint);

    match run(config).await {
        Ok(()) => {
            info!("Document submitted successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to submit document: {}", e);
            ExitCode::FAILURE
        }
    }
}
