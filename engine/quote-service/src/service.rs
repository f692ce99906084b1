//! Service state management and component initialization

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::info;

use crate::config::ServiceConfig;
use order_gateway::OrderGateway;
use order_store::{create_order_store, OrderStore};

/// Service state containing all initialized components
pub struct ServiceState {
    /// Service configuration
    pub config: ServiceConfig,

    /// Order store shared with the gateway
    pub store: Arc<dyn OrderStore>,

    /// Service running state
    pub is_running: Arc<RwLock<bool>>,
}

impl ServiceState {
    /// Create a new service state with all components initialized
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        info!("Initializing service components...");

        info!("Initializing {} order store...", config.store.backend);
        let store = create_order_store(&config.store)
            .await
            .context("Failed to initialize order store")?;

        let existing = store.count().await.context("Failed to count stored orders")?;
        info!("Order store holds {} orders", existing);

        Ok(Self { config, store, is_running: Arc::new(RwLock::new(true)) })
    }

    /// Run the OrderGateway until `stop` fires
    pub async fn start_order_gateway(&self, stop: oneshot::Receiver<()>) -> Result<()> {
        info!("Starting OrderGateway...");

        let gateway = OrderGateway::new(self.config.gateway.clone(), self.store.clone());
        gateway
            .run(async move {
                let _ = stop.await;
            })
            .await
            .map_err(|e| anyhow!("OrderGateway failed: {e}"))
    }

    /// Check if the service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get service health status
    pub async fn health_check(&self) -> ServiceHealth {
        if !self.is_running().await {
            return ServiceHealth::Unhealthy;
        }
        match self.store.count().await {
            Ok(_) => ServiceHealth::Healthy,
            Err(_) => ServiceHealth::Degraded,
        }
    }

    /// Graceful shutdown of all components
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut running = self.is_running.write().await;
            if !*running {
                return Ok(());
            }
            *running = false;
        }

        info!("Closing {} order store...", self.store.backend_name());
        self.store.close().await;
        Ok(())
    }
}

/// Service health status
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceHealth {
    Healthy,
    Unhealthy,
    Degraded,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceHealth::Healthy)
    }
}
