//! mogreps-ingest - publish the newest MOGREPS file as a dataset document
//!
//! This is the main entry point for the mogreps-ingest job.

use std::process::ExitCode;
use tracing::{error, info, warn};

use mogreps_ingest::{init_tracing, log_error, Config, IngestError};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            error!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.log_level);
    info!("Starting mogreps-ingest v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::from(2);
    }

    match mogreps_ingest::run(&config).await {
        Ok(summary) => {
            info!(
                source = %summary.source_key,
                output = %summary.output_key,
                dataset_id = %summary.dataset.id,
                products = summary.products.len(),
                "Ingest finished"
            );
            ExitCode::SUCCESS
        }
        Err(e @ IngestError::SourceNotFound { .. }) => {
            warn!("{}. Exit the program", e);
            ExitCode::from(1)
        }
        Err(e) => {
            log_error(&e, "ingest run");
            ExitCode::from(2)
        }
    }
}
