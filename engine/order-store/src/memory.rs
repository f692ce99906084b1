//! In-memory order store

use crate::backend::OrderStore;
use crate::error::Result;
use crate::order::{format_timestamp, NewOrder, StoredOrder};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

/// Orders kept in a vector; ids follow insertion order starting at 1
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<StoredOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_at(&self, order: NewOrder, recorded_at: DateTime<Utc>) -> Result<StoredOrder> {
        let mut orders = self.orders.write().await;
        let id = orders.last().map_or(1, |last| last.id + 1);
        let stored = order.into_stored(id, format_timestamp(recorded_at));
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn query_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredOrder>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|order| order.stored_between(start, end)).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.orders.read().await.len() as u64)
    }

    async fn close(&self) {}

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
