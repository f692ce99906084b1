//! SQLite-backed order store

use crate::backend::OrderStore;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::order::{day_key, format_timestamp, NewOrder, StoredOrder};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    width REAL,
    height REAL,
    bottom_space REAL,
    weight REAL,
    quantity INTEGER,
    type TEXT,
    printing_method TEXT,
    color_count INTEGER,
    hand_attachment TEXT,
    price REAL,
    date TEXT
)";

const SELECT_ORDERS: &str = "SELECT id, width, height, bottom_space, weight, quantity, type, \
     printing_method, color_count, hand_attachment, price, date FROM orders";

/// Orders in a single `orders` table
#[derive(Debug, Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Open (or create) the database named by `config.database_url`
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to order database at {}", config.database_url);
        Ok(Self { pool })
    }
}

fn order_from_row(row: &SqliteRow) -> Result<StoredOrder> {
    let color_count: i64 = row.try_get("color_count")?;
    let color_count = u32::try_from(color_count)
        .map_err(|_| StoreError::invalid_record(format!("color_count out of range: {color_count}")))?;

    let product_type: String = row.try_get("type")?;
    let printing_method: String = row.try_get("printing_method")?;
    let hand_attachment: Option<String> = row.try_get("hand_attachment")?;

    Ok(StoredOrder {
        id: row.try_get("id")?,
        width: row.try_get("width")?,
        height: row.try_get("height")?,
        bottom_space: row.try_get("bottom_space")?,
        weight: row.try_get("weight")?,
        quantity: row.try_get("quantity")?,
        product_type: product_type.into(),
        printing_method: printing_method.into(),
        color_count,
        hand_attachment: hand_attachment.unwrap_or_default().into(),
        price: row.try_get("price")?,
        date: row.try_get("date")?,
    })
}

#[async_trait::async_trait]
impl OrderStore for SqliteOrderStore {
    async fn initialize(&self) -> Result<()> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_at(&self, order: NewOrder, recorded_at: DateTime<Utc>) -> Result<StoredOrder> {
        let date = format_timestamp(recorded_at);

        let result = sqlx::query(
            "INSERT INTO orders (width, height, bottom_space, weight, quantity, type, printing_method, \
             color_count, hand_attachment, price, date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.spec.width)
        .bind(order.spec.height)
        .bind(order.spec.bottom_space)
        .bind(order.quote.weight)
        .bind(order.spec.quantity)
        .bind(order.spec.product_type.as_str())
        .bind(order.spec.printing_method.as_str())
        .bind(i64::from(order.spec.color_count))
        .bind(order.spec.hand_attachment.as_str())
        .bind(order.quote.total_price)
        .bind(&date)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("Inserted order {} at {}", id, date);

        Ok(order.into_stored(id, date))
    }

    async fn query_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredOrder>> {
        let sql = format!("{SELECT_ORDERS} WHERE substr(date, 1, 10) BETWEEN ? AND ? ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(day_key(start))
            .bind(day_key(end))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Order database closed");
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
