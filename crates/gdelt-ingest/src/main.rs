//! gdeltloader - GDELT 2.0 download and ingestion tool

use clap::Parser;
use gdelt_common::logging::{init_logging, LogConfig, LogLevel};
use gdelt_ingest::{run, Cli, IngestConfig, RunOutcome};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("gdeltloader")
        .build();

    // Environment variables take precedence when present
    let log_config = match log_config.clone().merge_env() {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Ignoring invalid logging environment: {:#}", e);
            log_config
        },
    };

    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        },
    };

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "gdeltloader failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

async fn execute(cli: &Cli) -> gdelt_ingest::Result<()> {
    let config = IngestConfig::from_cli(cli)?;

    match run(config).await? {
        RunOutcome::GeoMapped { documents } => {
            info!(documents, "Geo mapping finished");
        },
        RunOutcome::ManifestOnly { manifest } => {
            info!(manifest = %manifest.display(), "Manifest ready; pass --download to ingest it");
        },
        RunOutcome::Ingested { manifest, summary } => {
            info!(
                manifest = %manifest.display(),
                recorded = summary.recorded,
                checksum_mismatches = summary.checksum_mismatches,
                "Run finished"
            );
        },
    }

    Ok(())
}
