//! PhishGuard
//!
//! Phishing URL scanner: serves the scan API or runs one-off scans from the
//! command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use phishguard_core::ModelId;
use phishguard_server::{
    create_router, AppConfig, AppState, ConfigOverrides, ScanPipeline, DEFAULT_MODEL,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "phishguard")]
#[command(author, version, about = "PhishGuard phishing URL scanner", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve,

    /// Scan one URL and print the result as JSON
    Scan {
        /// URL to scan
        url: String,

        /// Model to score with
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Include the normalized URL and feature vector
        #[arg(long)]
        explain: bool,
    },

    /// List configured models
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = AppConfig::load(&cli.config, &cli.overrides)?;
    info!("Configuration loaded ({} models)", config.classifiers.models.len());

    match cli.command {
        Commands::Serve => serve(config, cli.config).await,
        Commands::Scan {
            url,
            model,
            explain,
        } => scan(config, &url, &model, explain).await,
        Commands::Models => {
            for (id, spec) in &config.classifiers.models {
                println!(
                    "{:<12} {:<5} {}{}",
                    id,
                    spec.kind.as_str(),
                    spec.path.display(),
                    spec.description
                        .as_deref()
                        .map(|d| format!("  ({})", d))
                        .unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, config_path: PathBuf) -> Result<()> {
    info!("Starting PhishGuard server");

    let metrics_handle = init_metrics()?;

    let pipeline = ScanPipeline::from_config(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.server.listen, config.server.port).parse()?;

    let state = AppState::new(pipeline, config)
        .with_config_path(config_path)
        .with_metrics(metrics_handle);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn scan(config: AppConfig, url: &str, model: &str, explain: bool) -> Result<()> {
    let pipeline = ScanPipeline::from_config(&config)?;
    let report = pipeline.scan_detailed(url, &ModelId::from(model)).await?;

    let output = if explain {
        serde_json::json!({
            "result": report.result,
            "normalized_url": report.url.to_string(),
            "features": report.features,
        })
    } else {
        serde_json::to_value(&report.result)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("phishguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phishguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "phishguard_scans_total",
        "Completed scans by model and predicted label"
    );
    metrics::describe_counter!("phishguard_errors_total", "Failed scans by error kind");
    metrics::describe_histogram!(
        "phishguard_scan_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end scan latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
