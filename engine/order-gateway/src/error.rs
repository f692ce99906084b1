//! Error types for the OrderGateway

use order_export::ExportError;
use order_store::StoreError;
use pricing_engine::{QuoteError, UnknownOptionError, ValidationError};
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur in the OrderGateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    UnknownOption(#[from] UnknownOptionError),

    #[error("{0}")]
    Authentication(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("System error: {0}")]
    System(String),
}

impl From<QuoteError> for GatewayError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Validation(e) => GatewayError::Validation(e),
            QuoteError::UnknownOption(e) => GatewayError::UnknownOption(e),
        }
    }
}

impl From<String> for GatewayError {
    fn from(err: String) -> Self {
        GatewayError::System(err)
    }
}

impl GatewayError {
    /// HTTP status reported to the client
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::UnknownOption(_) => StatusCode::BAD_REQUEST,
            GatewayError::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Validation(e) => e.code(),
            GatewayError::UnknownOption(_) => "UNKNOWN_OPTION",
            GatewayError::Authentication(_) => "AUTHENTICATION_REQUIRED",
            GatewayError::Store(_) => "STORAGE_ERROR",
            GatewayError::Export(_) => "EXPORT_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

/// Error carried through warp's rejection system
#[derive(Debug)]
pub struct ApiRejection {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl warp::reject::Reject for ApiRejection {}

impl From<GatewayError> for ApiRejection {
    fn from(err: GatewayError) -> Self {
        Self { status: err.status_code(), code: err.code(), message: err.to_string() }
    }
}

/// Turn a gateway error into a warp rejection
pub fn reject(err: GatewayError) -> warp::Rejection {
    warp::reject::custom(ApiRejection::from(err))
}

/// Result type for OrderGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
