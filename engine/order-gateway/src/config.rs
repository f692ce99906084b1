//! Configuration for the OrderGateway

use pricing_engine::UnknownOptionPolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration for the OrderGateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Pricing configuration
    pub pricing: PricingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Directory served for `/` and other static paths
    pub public_dir: PathBuf,

    /// Largest accepted JSON body in bytes
    pub max_body_bytes: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false every caller counts as authenticated
    pub required: bool,

    /// Login user name; login always fails while unset
    pub username: Option<String>,

    /// Login password
    pub password: Option<String>,

    /// Idle lifetime of a session in seconds
    pub session_ttl_secs: u64,
}

/// Pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PricingConfig {
    /// Handling of option values outside the price tables
    pub unknown_options: UnknownOptionPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_PORT,
            public_dir: PathBuf::from("./public"),
            max_body_bytes: 16 * 1024,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { required: true, username: None, password: None, session_ttl_secs: 24 * 60 * 60 }
    }
}

impl GatewayConfig {
    /// Get the server address
    pub fn server_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
