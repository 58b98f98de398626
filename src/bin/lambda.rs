//! AWS Lambda entry point for the storefront watcher.
//!
//! Meant to run on a schedule with reserved concurrency of one; the
//! snapshot object has no locking. The event payload is ignored.
//!
//! ## Environment Variables
//!
//! - `PAGE_URL` (or `BOOTH_URL`): page to watch
//! - `S3_BUCKET`, `S3_KEY`: snapshot location
//! - `ENCRYPTED_WEBHOOK_URL` / `WEBHOOK_URL`: chat endpoint
//! - `ENCRYPTED_CHANNEL_NAME` / `CHANNEL_NAME`: chat channel
//! - `ITEM_PATH_PREFIX`: item href prefix (default `/items/`)
//! - `DIFF_MODE`, `BASELINE_POLICY`, `HTTP_TIMEOUT_SECS`
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::time::Instant;

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use storefront_watch::models::{Config, RunOutcome, RunStatus};
use storefront_watch::pipeline::WatchOptions;
use storefront_watch::runner;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

/// Lambda response payload.
#[derive(Debug, Serialize)]
struct WatchResponse {
    status: RunStatus,
    added: Vec<String>,
    removed: Vec<String>,
    current_count: usize,
    execution_time_ms: u64,
}

impl WatchResponse {
    fn from_outcome(outcome: RunOutcome, start: Instant) -> Self {
        Self {
            status: outcome.status,
            current_count: outcome.current.len(),
            added: outcome.added,
            removed: outcome.removed,
            execution_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Storefront watcher starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for scheduled events.
///
/// A failed run is returned as an error so the platform records the
/// invocation as failed.
#[instrument(skip(event))]
async fn handler(event: LambdaEvent<Value>) -> Result<WatchResponse, LambdaError> {
    let start = Instant::now();
    info!("Received event: {:?}", event.payload);

    let config = Config::from_env()?;

    match runner::run_configured(&config, WatchOptions::default()).await {
        Ok(outcome) => {
            let response = WatchResponse::from_outcome(outcome, start);
            info!(
                "Watch run finished: {:?}, {} added, {} removed in {}ms",
                response.status,
                response.added.len(),
                response.removed.len(),
                response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            if e.needs_reconciliation() {
                error!(reconcile = true, "Watch run failed after notifying: {}", e);
            } else {
                error!("Watch run failed: {}", e);
            }
            Err(e.into())
        }
    }
}
