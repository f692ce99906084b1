//! Price and weight computation
//!
//! The formula is a fixed business rule: a panel-area approximation of the
//! box drives the weight, and the flat option prices drive the price.

use crate::types::OrderSpec;
use serde::{Deserialize, Serialize};

/// Grams per unit of panel area
pub const WEIGHT_PER_UNIT_AREA: f64 = 70.0;

/// Price added per ink color, per unit
pub const PRICE_PER_COLOR: f64 = 2.0;

/// Flat tax applied to the quantity-adjusted price
pub const TAX_RATE: f64 = 0.15;

/// Result of pricing an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Tax-inclusive total for the whole quantity
    pub total_price: f64,
    /// Weight in grams
    pub weight: f64,
}

/// Every intermediate value of the price formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub area: f64,
    pub weight: f64,
    /// Per-unit price before quantity and tax
    pub base_price: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub total_price: f64,
}

impl From<PriceBreakdown> for Quote {
    fn from(breakdown: PriceBreakdown) -> Self {
        Self { total_price: breakdown.total_price, weight: breakdown.weight }
    }
}

/// Panel area: two width x height faces, the bottom, and two side strips
pub fn panel_area(width: f64, height: f64, bottom_space: f64) -> f64 {
    2.0 * (width * height) + (width * bottom_space) + 2.0 * (height * bottom_space)
}

/// Per-unit price from the option tables and the color count
pub fn base_price(spec: &OrderSpec) -> f64 {
    let mut base = spec.product_type.unit_price()
        + spec.printing_method.unit_price()
        + spec.hand_attachment.unit_price();
    base += f64::from(spec.color_count) * PRICE_PER_COLOR;
    base
}

/// Compute the full breakdown for an order.
///
/// Callers are expected to have run [`crate::validate`] first; this function
/// prices whatever it is given.
pub fn price_breakdown(spec: &OrderSpec) -> PriceBreakdown {
    let area = panel_area(spec.width, spec.height, spec.bottom_space);
    let weight = area * WEIGHT_PER_UNIT_AREA;

    let base_price = base_price(spec);
    let subtotal = base_price * spec.quantity as f64;
    let tax = subtotal * TAX_RATE;
    let total_price = subtotal + tax;

    PriceBreakdown { area, weight, base_price, subtotal, tax, total_price }
}

/// Compute the tax-inclusive price and the weight of an order. No rounding.
pub fn price(spec: &OrderSpec) -> Quote {
    let quote = Quote::from(price_breakdown(spec));
    tracing::debug!(
        "Priced {} x {} at {} ({} g)",
        spec.quantity,
        spec.product_type,
        quote.total_price,
        quote.weight
    );
    quote
}
