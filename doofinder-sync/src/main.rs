//! Doofinder Sync Main Entry Point
//!
//! Reads a feed of site content and indexes it into Doofinder, replacing
//! each production index once its temporary counterpart is fully uploaded.

use dotenv::dotenv;
use doofinder_sync::{Dependencies, Feed, SyncError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), SyncError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("doofinder_sync=info,doofinder_sync_repository=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| SyncError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "doofinder-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| SyncError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "doofinder-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting Doofinder sync");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let feed = Feed::load(&deps.config.feed_path).await?;

    let report = deps.job.run(&feed).await;
    report.log();

    if report.is_success() {
        info!(run_id = %report.run_id, "Doofinder sync completed successfully");
        Ok(())
    } else {
        let failed: Vec<&str> = report.failed_types().into_iter().map(|t| t.as_str()).collect();
        error!(run_id = %report.run_id, failed = ?failed, "Doofinder sync failed");
        Err(SyncError::run_failed(format!(
            "item types failed: {}",
            failed.join(", ")
        )))
    }
}
