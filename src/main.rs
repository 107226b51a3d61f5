//! logpipe - bounded log ingestion pipeline
//!
//! Accepts structured log submissions over HTTP, buffers them in a bounded
//! queue, and drains them through a pool of workers into per-origin error
//! counters.
//!
//! Module structure:
//! - `domain/` - Core event types (LogEvent, Severity)
//! - `io/` - External interfaces (submission gateway, HTTP server)
//! - `services/` - Pipeline core (queue, worker pool, aggregator)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use logpipe::infra::{Config, PipelineMetrics};
use logpipe::io::{start_http_server, SubmissionGateway};
use logpipe::services::{Pipeline, PipelineConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// logpipe - log ingestion and error aggregation service
#[derive(Parser, Debug)]
#[command(name = "logpipe", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for per-event visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "logpipe starting"
    );

    // Parse command line arguments using clap
    let args = Args::parse();

    // Load configuration from TOML file
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        port = %config.server_port(),
        worker_count = %config.worker_count(),
        queue_capacity = %config.queue_capacity(),
        processing_delay_ms = %config.processing_delay_ms(),
        metrics_interval_secs = %config.metrics_interval_secs(),
        "config_loaded"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics = Arc::new(PipelineMetrics::new());

    // Start the pipeline: workers are consuming before the HTTP surface
    // accepts any traffic
    let pipeline = Pipeline::start(
        PipelineConfig {
            worker_count: config.worker_count(),
            queue_capacity: config.queue_capacity(),
            processing_delay: Duration::from_millis(config.processing_delay_ms()),
        },
        metrics.clone(),
    );

    let gateway = Arc::new(SubmissionGateway::new(pipeline.queue(), metrics.clone()));
    let aggregator = pipeline.aggregator();

    // Start the HTTP ingestion server
    let http_gateway = gateway.clone();
    let http_aggregator = aggregator.clone();
    let http_metrics = metrics.clone();
    let http_port = config.server_port();
    let http_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        if let Err(e) =
            start_http_server(http_port, http_gateway, http_aggregator, http_metrics, http_shutdown)
                .await
        {
            error!(error = %e, "HTTP server error");
        }
    });

    // Start metrics reporter; also samples queue depth
    let reporter_metrics = metrics.clone();
    let reporter_queue = pipeline.queue();
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            reporter_metrics.set_queue_depth(reporter_queue.depth() as u64);
            reporter_metrics.report().log();
        }
    });

    // Run until Ctrl+C, then drain
    tokio::signal::ctrl_c().await.ok();
    info!("shutdown_signal_received");
    let _ = shutdown_tx.send(true);

    let snapshot = pipeline.shutdown().await;
    let mut origins: Vec<(String, u64)> = snapshot.into_iter().collect();
    origins.sort();
    for (origin, errors) in origins {
        info!(origin = %origin, errors = %errors, "final_error_count");
    }

    info!("logpipe shutdown complete");
    Ok(())
}
