//! PricingEngine - Order validation and quote computation
//!
//! This crate holds the business rules of the packaging quote service:
//! typed order options, the pre-pricing validation rules, and the fixed
//! price/weight formula. Everything here is pure; no I/O, no shared state.

pub mod error;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{UnknownOptionError, ValidationError};
pub use pricing::{price, price_breakdown, PriceBreakdown, Quote};
pub use types::{HandAttachment, OrderSpec, PrintingMethod, ProductType, UnknownOptionPolicy};
pub use validation::{check_options, validate};

/// Validate an order and, if it passes, price it.
///
/// Unrecognized options are handled according to `policy`.
pub fn quote(spec: &OrderSpec, policy: UnknownOptionPolicy) -> Result<Quote, QuoteError> {
    validate(spec)?;
    check_options(spec, policy)?;
    Ok(price(spec))
}

/// Any reason an order cannot be quoted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnknownOption(#[from] UnknownOptionError),
}
