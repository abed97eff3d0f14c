use anyhow::Result;
use clap::Parser;
use medusa_exporter::{
    client::MedusaClient,
    config::{Overrides, Settings},
    metrics::BackupMetrics,
    poller::Poller,
    publisher::SnapshotPublisher,
    server::start_server,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Medusa Exporter - Prometheus metrics exporter for Medusa backups of Apache Cassandra
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "MEDUSA_EXPORTER_CONFIG")]
    config: Option<String>,

    /// Address on which to expose metrics
    #[arg(long = "web.listen-address", value_name = "ADDRESS")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", value_name = "PATH")]
    telemetry_path: Option<String>,

    /// Collecting metrics interval in seconds
    #[arg(long = "collect.interval", value_name = "SECONDS")]
    collect_interval: Option<u64>,

    /// Full path to Medusa configuration file
    #[arg(long = "medusa.config-file", value_name = "FILE")]
    medusa_config_file: Option<String>,

    /// Prefix for shared storage
    #[arg(long = "medusa.prefix", value_name = "PREFIX")]
    medusa_prefix: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log.level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long = "log.format", value_name = "FORMAT")]
    log_format: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            listen_address: self.listen_address.clone(),
            telemetry_path: self.telemetry_path.clone(),
            collect_interval_seconds: self.collect_interval,
            medusa_config_file: self.medusa_config_file.clone(),
            medusa_prefix: self.medusa_prefix.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let settings = Settings::load_with(args.config.as_deref(), args.overrides())?;

    // Initialize logging
    init_logging(&settings.exporter.log_level, &settings.exporter.log_format)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Medusa exporter");
    if !settings.medusa.config_file.is_empty() {
        info!(file = %settings.medusa.config_file, "Custom Medusa configuration file");
    }
    if !settings.medusa.prefix.is_empty() {
        info!(
            prefix = %settings.medusa.prefix,
            "Collecting metrics for specific prefix in shared storage"
        );
    }
    info!(
        endpoint = %settings.exporter.telemetry_path,
        listen_address = %settings.exporter.listen_address,
        interval = settings.exporter.collect_interval_seconds,
        "Use exporter parameters"
    );

    let metrics = Arc::new(BackupMetrics::new()?);
    info!("Metrics registry initialized");

    // Start polling Medusa
    let publisher = SnapshotPublisher::new(metrics.clone(), settings.medusa.prefix.clone());
    let client = MedusaClient::new(settings.medusa.clone());
    let interval = Duration::from_secs(settings.exporter.collect_interval_seconds);
    let poller = tokio::spawn(Poller::new(client, publisher, interval).run());

    // Start HTTP server
    let result = start_server(
        &settings.exporter.listen_address,
        &settings.exporter.telemetry_path,
        metrics,
        shutdown_signal(),
    )
    .await;

    poller.abort();
    if let Err(e) = result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Medusa exporter stopped");
    Ok(())
}

/// Initialize structured logging with tracing.
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    Ok(())
}

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, stopping exporter"),
        _ = terminate => info!("Received SIGTERM, stopping exporter"),
    }
}
