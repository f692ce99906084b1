//! Signal handling for graceful shutdown

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::service::ServiceState;

type ShutdownSender = Arc<Mutex<Option<oneshot::Sender<()>>>>;

/// Fire the shutdown channel once; later signals are ignored
fn trigger(shutdown_tx: &ShutdownSender) {
    let sender = match shutdown_tx.lock() {
        Ok(mut slot) => slot.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(sender) = sender {
        let _ = sender.send(());
    }
}

/// Setup signal handlers for graceful shutdown
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let shutdown_tx: ShutdownSender = Arc::new(Mutex::new(Some(shutdown_tx)));

    // Handle Ctrl+C (SIGINT)
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C signal: {}", e);
                return;
            }

            info!("Ctrl+C signal received");
            trigger(&shutdown_tx);
        });
    }

    // Handle SIGTERM (Unix only)
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGTERM;
        use std::sync::atomic::{AtomicBool, Ordering};

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTERM, shutdown_flag.clone())?;

        tokio::spawn(async move {
            // Poll for signal
            while !shutdown_flag.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            info!("SIGTERM signal received");
            trigger(&shutdown_tx);
        });
    }

    Ok(shutdown_rx)
}

/// Graceful shutdown handler
pub async fn graceful_shutdown(
    service_state: Arc<ServiceState>,
    gateway_stop: oneshot::Sender<()>,
    gateway_handle: JoinHandle<Result<()>>,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    // Stop accepting new requests; in-flight ones are allowed to finish
    let _ = gateway_stop.send(());

    let shutdown_timeout = Duration::from_secs(service_state.config.service.shutdown_timeout_secs);
    match timeout(shutdown_timeout, gateway_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("OrderGateway stopped gracefully");
        }
        Ok(Ok(Err(e))) => {
            error!("OrderGateway failed: {:#}", e);
        }
        Ok(Err(e)) => {
            error!("OrderGateway task failed: {}", e);
        }
        Err(_) => {
            warn!("OrderGateway did not stop within timeout, forcing shutdown");
        }
    }

    // Shutdown other components
    if let Err(e) = service_state.shutdown().await {
        error!("Failed to shutdown service components: {}", e);
    }

    info!("Graceful shutdown complete");
    Ok(())
}
