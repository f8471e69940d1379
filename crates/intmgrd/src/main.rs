//! intmgrd - INT provisioning manager daemon.
//!
//! Entry point for the intmgrd daemon.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intmgrd::IntdConfig;

/// EVC in-band telemetry provisioning manager
#[derive(Parser, Debug)]
#[command(name = "intmgrd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting intmgrd ---");

    let config = match &args.config {
        Some(path) => IntdConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => IntdConfig::default(),
    };
    info!(
        max_attempts = config.retry.max_attempts,
        base_delay_ms = config.retry.base_delay_ms,
        "retry policy configured"
    );

    // The IntManager is constructed here once the hosting controller's
    // service registry provides the flow backend, circuit inventory, and
    // proxy port resolver implementations.
    info!("intmgrd initialization complete; awaiting controller integration");

    Ok(())
}
