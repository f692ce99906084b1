//! Order store trait and backend selection

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Result, StoreError};
use crate::memory::InMemoryOrderStore;
use crate::order::{NewOrder, StoredOrder};
use crate::sqlite::SqliteOrderStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Abstract trait for order storage backends
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// Prepare the backend (create the table if missing)
    async fn initialize(&self) -> Result<()>;

    /// Persist an order with an explicit storage time
    async fn insert_at(&self, order: NewOrder, recorded_at: DateTime<Utc>) -> Result<StoredOrder>;

    /// Persist an order stamped with the current time
    async fn insert(&self, order: NewOrder) -> Result<StoredOrder> {
        self.insert_at(order, Utc::now()).await
    }

    /// Orders whose storage day lies in `[start, end]`, ascending by id
    async fn query_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredOrder>>;

    /// Number of stored orders
    async fn count(&self) -> Result<u64>;

    /// Release backend resources
    async fn close(&self);

    /// Backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Build and initialize the backend selected by `config`
pub async fn create_order_store(config: &StoreConfig) -> Result<Arc<dyn OrderStore>> {
    config.validate().map_err(StoreError::config)?;

    let store: Arc<dyn OrderStore> = match config.backend {
        StoreBackend::Sqlite => Arc::new(SqliteOrderStore::connect(config).await?),
        StoreBackend::Memory => Arc::new(InMemoryOrderStore::new()),
    };

    store.initialize().await?;
    tracing::info!("Order store ready ({} backend)", store.backend_name());

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = create_order_store(&StoreConfig::memory()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_sqlite_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            database_url: format!("sqlite://{}", temp_dir.path().join("orders.db").display()),
            ..StoreConfig::default()
        };

        let store = create_order_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(store.count().await.unwrap(), 0);
        store.close().await;
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = StoreConfig { database_url: String::new(), ..StoreConfig::default() };
        let result = create_order_store(&config).await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
