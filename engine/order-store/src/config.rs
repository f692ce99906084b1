//! Configuration for the order store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend holds the orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {other}")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Sqlite => f.write_str("sqlite"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Order store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage backend
    pub backend: StoreBackend,

    /// sqlx connection URL, e.g. `sqlite://orders.db`
    pub database_url: String,

    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            database_url: "sqlite://orders.db".to_string(),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    /// In-memory store, nothing survives the process
    pub fn memory() -> Self {
        Self { backend: StoreBackend::Memory, ..Self::default() }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::Sqlite {
            if self.database_url.trim().is_empty() {
                return Err("Database URL must not be empty".to_string());
            }
            if self.max_connections == 0 {
                return Err("Max connections must be greater than 0".to_string());
            }
        }
        Ok(())
    }
}
