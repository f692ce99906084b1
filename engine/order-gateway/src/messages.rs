//! Request and response bodies for the OrderGateway REST API

use pricing_engine::{HandAttachment, OrderSpec, PrintingMethod, ProductType, Quote};
use serde::{Deserialize, Deserializer, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response; `token` is present only on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Authentication status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

/// Quote calculation request.
///
/// The browser form posts every field as a string, so numbers are accepted
/// either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    #[serde(deserialize_with = "lenient::float")]
    pub width: f64,
    #[serde(deserialize_with = "lenient::float")]
    pub height: f64,
    #[serde(deserialize_with = "lenient::float")]
    pub bottom_space: f64,
    #[serde(deserialize_with = "lenient::integer")]
    pub quantity: i64,
    /// Missing or null prices as an unrecognized (empty) type
    #[serde(rename = "type", default)]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub printing_method: Option<PrintingMethod>,
    #[serde(deserialize_with = "lenient::count")]
    pub color_count: u32,
    #[serde(default)]
    pub hand_attachment: Option<HandAttachment>,
    #[serde(default)]
    pub store: bool,
}

impl CalculateRequest {
    /// Split into the priced attributes and the store flag
    pub fn into_parts(self) -> (OrderSpec, bool) {
        let spec = OrderSpec {
            width: self.width,
            height: self.height,
            bottom_space: self.bottom_space,
            quantity: self.quantity,
            product_type: self.product_type.unwrap_or_else(|| ProductType::from("")),
            printing_method: self.printing_method.unwrap_or_else(|| PrintingMethod::from("")),
            color_count: self.color_count,
            hand_attachment: self.hand_attachment.unwrap_or_default(),
        };
        (spec, self.store)
    }
}

/// Quote returned when the order is not stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub total_price: f64,
    pub weight: f64,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self { total_price: quote.total_price, weight: quote.weight }
    }
}

/// Quote returned when the order was stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuoteResponse {
    pub id: i64,
    pub total_price: f64,
    pub weight: f64,
    pub date: String,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub orders: u64,
}

mod lenient {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        Text(String),
    }

    fn as_f64<E: Error>(value: NumberOrString) -> Result<f64, E> {
        let parsed = match value {
            NumberOrString::Number(n) => n.as_f64(),
            NumberOrString::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| E::custom("expected a number"))
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        as_f64(NumberOrString::deserialize(deserializer)?)
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = NumberOrString::deserialize(deserializer)?;
        if let NumberOrString::Number(n) = &value {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
        }
        let v = as_f64::<D::Error>(value)?;
        if v.fract() != 0.0 || v < i64::MIN as f64 || v > i64::MAX as f64 {
            return Err(D::Error::custom("expected an integer"));
        }
        Ok(v as i64)
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let v = integer(deserializer)?;
        u32::try_from(v).map_err(|_| D::Error::custom("expected a non-negative integer"))
    }
}
