//! API composer server.
//!
//! Loads a TOML configuration, registers the configured upstream adapters and
//! JSON mergers, and serves composed responses until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use api_composer::config::{load_config, ComposerConfig};
use api_composer::lifecycle::{build_dispatcher, signals, Shutdown};
use api_composer::observability::{logging, metrics};
use api_composer::ComposerServer;

#[derive(Parser)]
#[command(name = "api-composer")]
#[command(about = "Fans requests out to backend adapters and merges their responses", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ComposerConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!("api-composer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = Arc::new(build_dispatcher(&config)?);
    if dispatcher.registry().is_empty() {
        tracing::warn!("No adapters or mergers configured; every request will return 404");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        connect_timeout_secs = config.timeouts.connect_secs,
        inactivity_timeout_secs = config.timeouts.inactivity_secs,
        on_failure = ?config.fan_out.on_failure,
        "Configuration loaded"
    );

    let shutdown = Arc::new(Shutdown::new());
    let server = ComposerServer::new(dispatcher, &config.listener);
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if let Err(e) = signals::shutdown_on_ctrl_c(&signal_shutdown).await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
