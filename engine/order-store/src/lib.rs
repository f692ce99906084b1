//! # Order Store
//!
//! Append-only storage for priced packaging orders.
//!
//! ## Architecture
//!
//! - **OrderStore**: async trait the HTTP layer talks to
//! - **SqliteOrderStore**: single `orders` table behind a sqlx pool
//! - **InMemoryOrderStore**: process-local backend for tests and throwaway runs
//!
//! Orders are written once and never updated or deleted. Each insert gets a
//! new increasing id and an RFC 3339 UTC storage timestamp.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod order;
pub mod sqlite;

pub use backend::{create_order_store, OrderStore};
pub use config::{StoreBackend, StoreConfig};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use order::{current_month_bounds, format_timestamp, month_bounds, NewOrder, StoredOrder};
pub use sqlite::SqliteOrderStore;
