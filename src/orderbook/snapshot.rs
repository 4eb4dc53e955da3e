//! Operational order-book state owned by one [`super::manager::OrderBookManager`].

use crate::types::{OrderBook, PriceLevel};

/// Mutable, sorted order-book state for one (venue, symbol). Distinct from
/// [`OrderBook`] (the parser's output type) because a snapshot additionally
/// carries the invariant that both sides stay sorted across incremental
/// updates, not just on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub venue: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub sequence: i64,
    pub timestamp: i64,
}

impl OrderBookSnapshot {
    /// Build a snapshot from a freshly parsed full book, sorting both sides.
    pub fn from_orderbook(mut book: OrderBook) -> Self {
        book.sort_sides();
        Self {
            symbol: book.symbol,
            venue: book.venue,
            bids: book.bids,
            asks: book.asks,
            sequence: book.sequence,
            timestamp: book.timestamp,
        }
    }

    /// Copy out an owned, read-only [`OrderBook`] view for strategy input.
    pub fn to_orderbook(&self) -> OrderBook {
        OrderBook {
            symbol: self.symbol.clone(),
            venue: self.venue.clone(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            sequence: self.sequence,
            timestamp: self.timestamp,
        }
    }

    pub fn top_n(&self, n: usize) -> (Vec<PriceLevel>, Vec<PriceLevel>, i64) {
        let bids = self.bids.iter().take(n).copied().collect();
        let asks = self.asks.iter().take(n).copied().collect();
        (bids, asks, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: i64, qty: i64) -> PriceLevel {
        PriceLevel {
            price: Decimal::from(price),
            quantity: Decimal::from(qty),
            timestamp: 1,
        }
    }

    use rust_decimal::Decimal;

    #[test]
    fn from_orderbook_sorts_both_sides() {
        let book = OrderBook {
            symbol: "BTC".into(),
            venue: "ex-a".into(),
            bids: vec![level(100, 1), level(300, 1), level(200, 1)],
            asks: vec![level(500, 1), level(400, 1), level(450, 1)],
            sequence: 10,
            timestamp: 10,
        };
        let snap = OrderBookSnapshot::from_orderbook(book);
        assert_eq!(
            snap.bids.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![dec!(300), dec!(200), dec!(100)]
        );
        assert_eq!(
            snap.asks.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![dec!(400), dec!(450), dec!(500)]
        );
    }
}
