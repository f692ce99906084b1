//! Packaging Quote Production Service
//!
//! Entry point for the quote platform. Loads configuration, opens the order
//! store, serves the OrderGateway, and shuts everything down on Ctrl+C or
//! SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

use quote_service::{
    graceful_shutdown, initialize_logging, load_configuration, setup_signal_handlers, ServiceState,
};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "packquote", version, about = "Packaging order pricing service")]
struct Cli {
    /// TOML configuration file (overrides QUOTE_CONFIG_FILE)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print it, and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pick up a local .env before reading any variables
    dotenv::dotenv().ok();

    // Load configuration
    let config = load_configuration(cli.config.as_deref())?;

    if cli.check_config {
        let mut shown = config.clone();
        if shown.gateway.auth.password.is_some() {
            shown.gateway.auth.password = Some("********".to_string());
        }
        println!("{}", toml::to_string_pretty(&shown).context("Failed to render configuration")?);
        return Ok(());
    }

    // Initialize logging first
    let _log_guard = initialize_logging(&config.logging)?;

    info!("Starting Packaging Quote Service v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config.service.config_file {
        info!("Configuration loaded from {:?}", path);
    }

    // Create service state
    let service_state = Arc::new(ServiceState::new(config).await?);
    let health = service_state.health_check().await;
    anyhow::ensure!(health.is_healthy(), "Service unhealthy after start-up: {:?}", health);
    info!("Service state initialized");

    // Setup signal handlers for graceful shutdown
    let shutdown_signal = setup_signal_handlers()?;
    info!("Signal handlers configured");

    // Start the OrderGateway in a separate task
    let (gateway_stop, gateway_stop_rx) = oneshot::channel();
    let mut gateway_handle = {
        let state = service_state.clone();
        tokio::spawn(async move { state.start_order_gateway(gateway_stop_rx).await })
    };

    // Wait for shutdown signal, or for the gateway to exit on its own
    info!("Packaging Quote Service is running. Press Ctrl+C to shutdown gracefully.");
    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received. Initiating graceful shutdown...");
            graceful_shutdown(service_state, gateway_stop, gateway_handle).await?;
        }
        result = &mut gateway_handle => {
            service_state.shutdown().await?;
            match result {
                Ok(Ok(())) => info!("OrderGateway exited"),
                Ok(Err(e)) => {
                    error!("{:#}", e);
                    return Err(e);
                }
                Err(e) => return Err(e).context("OrderGateway task panicked"),
            }
        }
    }

    info!("Packaging Quote Service shutdown complete");
    Ok(())
}
