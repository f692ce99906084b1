//! Main OrderGateway implementation

use crate::auth::SessionManager;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::rest_api::{create_routes, GatewayState};

use order_store::OrderStore;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Main OrderGateway service
pub struct OrderGateway {
    /// Gateway configuration
    config: GatewayConfig,

    /// State shared by the route handlers
    state: Arc<GatewayState>,
}

impl OrderGateway {
    /// Create a new OrderGateway
    pub fn new(config: GatewayConfig, store: Arc<dyn OrderStore>) -> Self {
        let sessions = Arc::new(SessionManager::new(config.auth.clone()));
        let state = Arc::new(GatewayState::new(store, sessions, config.pricing.unknown_options));
        Self { config, state }
    }

    /// Serve HTTP until `shutdown` resolves
    pub async fn run<S>(self, shutdown: S) -> GatewayResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .config
            .server_addr()
            .map_err(|e| GatewayError::Config(format!("Invalid server address: {e}")))?;

        if !self.config.server.public_dir.is_dir() {
            info!("Static directory {:?} not found; only API routes are served", self.config.server.public_dir);
        }

        let routes = create_routes(
            self.state.clone(),
            self.config.server.public_dir.clone(),
            self.config.server.max_body_bytes,
        );

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .map_err(|e| GatewayError::Config(format!("Failed to bind {addr}: {e}")))?;

        info!("OrderGateway listening on http://{}", bound);

        let sweeper = self.spawn_session_sweeper();
        server.await;
        sweeper.abort();

        info!("OrderGateway stopped");
        Ok(())
    }

    /// Periodically drop idle sessions
    fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let sessions = self.state.sessions.clone();
        let period = Duration::from_secs(self.config.auth.session_ttl_secs.clamp(1, 300));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = sessions.cleanup_expired_sessions().await;
                if removed > 0 {
                    debug!("Removed {} expired sessions", removed);
                }
            }
        })
    }
}
