//! Order option types
//!
//! Every option parses from its wire string without failing. Values outside
//! the fixed tables land in an `Unrecognized` variant that keeps the raw text,
//! so the caller decides whether to reject them or price them at zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product type, each with a flat base price
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Unrecognized(String),
}

impl ProductType {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            ProductType::Type1 => "type1",
            ProductType::Type2 => "type2",
            ProductType::Type3 => "type3",
            ProductType::Type4 => "type4",
            ProductType::Type5 => "type5",
            ProductType::Unrecognized(raw) => raw,
        }
    }

    /// Flat price per unit; zero when unrecognized
    pub fn unit_price(&self) -> f64 {
        match self {
            ProductType::Type1 => 10.0,
            ProductType::Type2 => 20.0,
            ProductType::Type3 => 30.0,
            ProductType::Type4 => 40.0,
            ProductType::Type5 => 50.0,
            ProductType::Unrecognized(_) => 0.0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ProductType::Unrecognized(_))
    }
}

impl From<&str> for ProductType {
    fn from(value: &str) -> Self {
        match value {
            "type1" => ProductType::Type1,
            "type2" => ProductType::Type2,
            "type3" => ProductType::Type3,
            "type4" => ProductType::Type4,
            "type5" => ProductType::Type5,
            other => ProductType::Unrecognized(other.to_string()),
        }
    }
}

/// Printing method; `None` means the order is unprinted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrintingMethod {
    None,
    Method1,
    Method2,
    Method3,
    Method4,
    Method5,
    Unrecognized(String),
}

impl PrintingMethod {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            PrintingMethod::None => "none",
            PrintingMethod::Method1 => "method1",
            PrintingMethod::Method2 => "method2",
            PrintingMethod::Method3 => "method3",
            PrintingMethod::Method4 => "method4",
            PrintingMethod::Method5 => "method5",
            PrintingMethod::Unrecognized(raw) => raw,
        }
    }

    /// Flat price per unit; zero when unprinted or unrecognized
    pub fn unit_price(&self) -> f64 {
        match self {
            PrintingMethod::None => 0.0,
            PrintingMethod::Method1 => 5.0,
            PrintingMethod::Method2 => 10.0,
            PrintingMethod::Method3 => 15.0,
            PrintingMethod::Method4 => 20.0,
            PrintingMethod::Method5 => 25.0,
            PrintingMethod::Unrecognized(_) => 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PrintingMethod::None)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PrintingMethod::Unrecognized(_))
    }
}

impl From<&str> for PrintingMethod {
    fn from(value: &str) -> Self {
        match value {
            "none" => PrintingMethod::None,
            "method1" => PrintingMethod::Method1,
            "method2" => PrintingMethod::Method2,
            "method3" => PrintingMethod::Method3,
            "method4" => PrintingMethod::Method4,
            "method5" => PrintingMethod::Method5,
            other => PrintingMethod::Unrecognized(other.to_string()),
        }
    }
}

/// Hand attachment option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HandAttachment {
    /// No attachment requested (`"none"` or empty)
    #[default]
    None,
    Attachment1,
    Attachment2,
    Attachment3,
    Unrecognized(String),
}

impl HandAttachment {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            HandAttachment::None => "none",
            HandAttachment::Attachment1 => "attachment1",
            HandAttachment::Attachment2 => "attachment2",
            HandAttachment::Attachment3 => "attachment3",
            HandAttachment::Unrecognized(raw) => raw,
        }
    }

    /// Flat price per unit; zero when absent or unrecognized
    pub fn unit_price(&self) -> f64 {
        match self {
            HandAttachment::None => 0.0,
            HandAttachment::Attachment1 => 3.0,
            HandAttachment::Attachment2 => 6.0,
            HandAttachment::Attachment3 => 9.0,
            HandAttachment::Unrecognized(_) => 0.0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, HandAttachment::Unrecognized(_))
    }
}

impl From<&str> for HandAttachment {
    fn from(value: &str) -> Self {
        match value {
            "" | "none" => HandAttachment::None,
            "attachment1" => HandAttachment::Attachment1,
            "attachment2" => HandAttachment::Attachment2,
            "attachment3" => HandAttachment::Attachment3,
            other => HandAttachment::Unrecognized(other.to_string()),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),+) => {
        $(
            impl From<String> for $ty {
                fn from(value: String) -> Self {
                    <$ty>::from(value.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.as_str().to_string()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

string_conversions!(ProductType, PrintingMethod, HandAttachment);

/// What to do with an option value that is not in the price tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOptionPolicy {
    /// Accept the order and let the option contribute nothing to the price
    #[default]
    PriceAsZero,
    /// Refuse to quote the order
    Reject,
}

/// The priced attributes of a packaging order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub width: f64,
    pub height: f64,
    pub bottom_space: f64,
    /// Signed so that non-positive counts reach validation instead of failing to parse
    pub quantity: i64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub printing_method: PrintingMethod,
    pub color_count: u32,
    #[serde(default)]
    pub hand_attachment: HandAttachment,
}
