//! Error types for the PricingEngine

use thiserror::Error;

/// Reasons an order is refused before any pricing runs
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,

    #[error("Color count and printing method mismatch")]
    ColorMethodMismatch,
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidQuantity => "INVALID_QUANTITY",
            ValidationError::ColorMethodMismatch => "COLOR_METHOD_MISMATCH",
        }
    }
}

/// An option value outside the price tables, refused under `UnknownOptionPolicy::Reject`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized {field}: {value}")]
pub struct UnknownOptionError {
    /// Request field name (`type`, `printing_method`, `hand_attachment`)
    pub field: &'static str,
    pub value: String,
}
