//! Shared value types that flow between every layer: gateway bytes are
//! parsed into these, the strategy consumes and produces them, the executor
//! hands them back out as order results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price/quantity level in an order book. Immutable per update —
/// a level is replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: i64,
}

/// Which side of the book a level belongs to, used when re-sorting after a
/// delta is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

/// Venue-normalized order book, straight off the wire (REST snapshot or a
/// WebSocket push that the wrapper has already normalized to this shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub venue: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub sequence: i64,
    pub timestamp: i64,
}

impl OrderBook {
    /// Bids sorted strictly descending, asks strictly ascending. Used both
    /// for a freshly-parsed book and to restore the invariant after a delta.
    pub fn sort_sides(&mut self) {
        self.bids.sort_by_key(|b| std::cmp::Reverse(b.price));
        self.asks.sort_by_key(|a| a.price);
    }
}

/// Account balance for one currency on one venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBalance {
    pub venue: String,
    pub currency: String,
    pub balance: Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub venue: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub venue: String,
    pub symbol: String,
    pub status: String,
    pub filled_quantity: Decimal,
    pub average_price: Option<Decimal>,
    pub raw: Option<serde_json::Value>,
}
