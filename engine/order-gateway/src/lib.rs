//! OrderGateway - REST API for the packaging quote service
//!
//! This module provides the HTTP interface: login and session handling,
//! quote calculation with optional storage, the monthly record listing and
//! its spreadsheet download, health, and static files for the browser form.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod rest_api;

pub use auth::SessionManager;
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::OrderGateway;
pub use rest_api::{create_routes, GatewayState};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";
