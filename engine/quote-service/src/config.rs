//! Service configuration management
//!
//! Layering: built-in defaults, then an optional TOML file, then environment
//! variables, then validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use order_gateway::GatewayConfig;
use order_store::{StoreBackend, StoreConfig};
use pricing_engine::UnknownOptionPolicy;

/// Environment variable naming the config file
pub const CONFIG_FILE_ENV: &str = "QUOTE_CONFIG_FILE";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// OrderGateway configuration
    pub gateway: GatewayConfig,

    /// Order store configuration
    pub store: StoreConfig,

    /// Service-level configuration
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Configuration file path
    pub config_file: Option<PathBuf>,

    /// Enable development mode (debug logging unless a level is set)
    pub development_mode: bool,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,

    /// Log file path (if None, logs to stdout)
    pub file: Option<PathBuf>,

    /// Rotate the log file daily
    pub rotation: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { config_file: None, development_mode: false, shutdown_timeout_secs: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None, rotation: true }
    }
}

/// Load configuration from files and environment variables
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let config_file = config_file
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from));

    let mut config = match &config_file {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(path)?
        }
        None => ServiceConfig::default(),
    };
    config.service.config_file = config_file;

    // Override with environment variables
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {path:?}"))
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| anyhow!("Invalid {key}={value:?}: {e}"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid {key}={value:?}: expected true or false")),
    }
}

fn parse_policy(key: &str, value: &str) -> Result<UnknownOptionPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "zero" | "price_as_zero" => Ok(UnknownOptionPolicy::PriceAsZero),
        "reject" => Ok(UnknownOptionPolicy::Reject),
        _ => Err(anyhow!("Invalid {key}={value:?}: expected zero or reject")),
    }
}

/// Apply environment overrides read through `lookup`
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Server
    if let Some(host) = lookup("QUOTE_HOST") {
        config.gateway.server.host = host;
    }
    if let Some(port) = lookup("QUOTE_PORT") {
        config.gateway.server.port = parse_var("QUOTE_PORT", &port)?;
    }
    if let Some(dir) = lookup("QUOTE_PUBLIC_DIR") {
        config.gateway.server.public_dir = PathBuf::from(dir);
    }

    // Store
    if let Some(backend) = lookup("QUOTE_STORE_BACKEND") {
        config.store.backend = parse_var::<StoreBackend>("QUOTE_STORE_BACKEND", &backend)?;
    }
    if let Some(url) = lookup("DATABASE_URL") {
        config.store.database_url = url;
    }
    if let Some(max) = lookup("QUOTE_DB_MAX_CONNECTIONS") {
        config.store.max_connections = parse_var("QUOTE_DB_MAX_CONNECTIONS", &max)?;
    }

    // Auth
    if let Some(required) = lookup("QUOTE_AUTH_REQUIRED") {
        config.gateway.auth.required = parse_flag("QUOTE_AUTH_REQUIRED", &required)?;
    }
    if let Some(username) = lookup("QUOTE_USERNAME") {
        config.gateway.auth.username = Some(username);
    }
    if let Some(password) = lookup("QUOTE_PASSWORD") {
        config.gateway.auth.password = Some(password);
    }
    if let Some(ttl) = lookup("QUOTE_SESSION_TTL_SECS") {
        config.gateway.auth.session_ttl_secs = parse_var("QUOTE_SESSION_TTL_SECS", &ttl)?;
    }

    // Pricing
    if let Some(policy) = lookup("QUOTE_UNKNOWN_OPTIONS") {
        config.gateway.pricing.unknown_options = parse_policy("QUOTE_UNKNOWN_OPTIONS", &policy)?;
    }

    // Logging and service
    if let Some(dev_mode) = lookup("QUOTE_DEV_MODE") {
        config.service.development_mode = parse_flag("QUOTE_DEV_MODE", &dev_mode)?;
        if config.service.development_mode && lookup("QUOTE_LOG_LEVEL").is_none() {
            config.logging.level = "debug".to_string();
        }
    }
    if let Some(level) = lookup("QUOTE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = lookup("QUOTE_LOG_FORMAT") {
        config.logging.format = format;
    }
    if let Some(file) = lookup("QUOTE_LOG_FILE") {
        config.logging.file = Some(PathBuf::from(file));
    }
    if let Some(timeout) = lookup("QUOTE_SHUTDOWN_TIMEOUT_SECS") {
        config.service.shutdown_timeout_secs = parse_var("QUOTE_SHUTDOWN_TIMEOUT_SECS", &timeout)?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    // Validate server port
    if config.gateway.server.port == 0 {
        return Err(anyhow!("Invalid server port: {}", config.gateway.server.port));
    }

    config
        .gateway
        .server_addr()
        .with_context(|| format!("Invalid server host: {}", config.gateway.server.host))?;

    config.store.validate().map_err(|e| anyhow!("Invalid store configuration: {e}"))?;

    if config.service.shutdown_timeout_secs == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    Ok(())
}
