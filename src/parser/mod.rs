//! Raw wire bytes in, normalized domain types out.

pub mod ex_a;
pub mod ex_b;

use rust_decimal::Decimal;

use crate::errors::Result;
use crate::types::{NamedBalance, OrderResult};

/// Venue-specific JSON layout, normalized to the shared [`crate::types`] shapes.
pub trait Parser: Send + Sync {
    fn parse_orderbook(&self, raw: &[u8]) -> Result<crate::types::OrderBook>;
    fn parse_balance(&self, raw: &[u8]) -> Result<Vec<NamedBalance>>;
    fn parse_order_result(&self, raw: &[u8]) -> Result<OrderResult>;
}

/// `serde_json::Value` fields come back as JSON numbers, strings, or nulls
/// depending on the venue; this normalizes any of those into a `Decimal`.
pub(crate) fn value_to_decimal(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => s.parse().unwrap_or_default(),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|f| Decimal::try_from(f).unwrap_or_default())
            .unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

pub(crate) fn value_to_optional_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(value_to_decimal(other)),
    }
}
