//! Order records and date helpers

use chrono::{DateTime, Datelike, Months, NaiveDate, SecondsFormat, Utc};
use pricing_engine::{HandAttachment, OrderSpec, PrintingMethod, ProductType, Quote};
use serde::{Deserialize, Serialize};

/// A priced order on its way into the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub spec: OrderSpec,
    pub quote: Quote,
}

impl NewOrder {
    pub fn new(spec: OrderSpec, quote: Quote) -> Self {
        Self { spec, quote }
    }

    /// Attach the store-assigned id and timestamp
    pub fn into_stored(self, id: i64, date: String) -> StoredOrder {
        StoredOrder {
            id,
            width: self.spec.width,
            height: self.spec.height,
            bottom_space: self.spec.bottom_space,
            weight: self.quote.weight,
            quantity: self.spec.quantity,
            product_type: self.spec.product_type,
            printing_method: self.spec.printing_method,
            color_count: self.spec.color_count,
            hand_attachment: self.spec.hand_attachment,
            price: self.quote.total_price,
            date,
        }
    }
}

/// A persisted order. Field names follow the `orders` table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOrder {
    pub id: i64,
    pub width: f64,
    pub height: f64,
    pub bottom_space: f64,
    pub weight: f64,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub printing_method: PrintingMethod,
    pub color_count: u32,
    pub hand_attachment: HandAttachment,
    /// Tax-inclusive total
    pub price: f64,
    /// RFC 3339 UTC storage timestamp
    pub date: String,
}

impl StoredOrder {
    /// Calendar day part of the storage timestamp (`YYYY-MM-DD`)
    pub fn day(&self) -> &str {
        self.date.get(..10).unwrap_or(&self.date)
    }

    /// True when the storage day lies in `[start, end]`
    pub fn stored_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let (start, end) = (day_key(start), day_key(end));
        let day = self.day();
        start.as_str() <= day && day <= end.as_str()
    }
}

/// Storage timestamp format: `2026-10-19T08:15:30.123Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `YYYY-MM-DD`, the form stored timestamps are compared against
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// First and last calendar day of the month containing `today`
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today - chrono::Days::new(u64::from(today.day0()));
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Month bounds for the current UTC date
pub fn current_month_bounds() -> (NaiveDate, NaiveDate) {
    month_bounds(Utc::now().date_naive())
}
