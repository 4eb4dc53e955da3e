//! Owns the mutable state for one (venue, symbol) order book.

use parking_lot::RwLock;

use super::delta::Delta;
use super::snapshot::OrderBookSnapshot;
use crate::errors::{Error, Result};
use crate::types::OrderBook;
use crate::wrapper::Wrapper;

#[derive(Default)]
pub struct OrderBookManager {
    state: RwLock<Option<OrderBookSnapshot>>,
}

impl OrderBookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull a fresh snapshot through the wrapper and install it.
    pub async fn initialize(
        &self,
        wrapper: &dyn Wrapper,
        symbol: &str,
    ) -> Result<OrderBookSnapshot> {
        let book = wrapper.get_orderbook(symbol).await?;
        Ok(self.update_full(book))
    }

    pub fn update_full(&self, book: OrderBook) -> OrderBookSnapshot {
        let snapshot = OrderBookSnapshot::from_orderbook(book);
        *self.state.write() = Some(snapshot.clone());
        snapshot
    }

    pub fn apply_delta(&self, delta: &Delta) -> Result<OrderBookSnapshot> {
        let mut guard = self.state.write();
        let snapshot = guard
            .as_mut()
            .ok_or_else(|| Error::not_initialized("orderbook", delta.symbol.clone()))?;
        delta.apply(snapshot)?;
        Ok(snapshot.clone())
    }

    pub fn snapshot(&self) -> Result<OrderBookSnapshot> {
        self.state
            .read()
            .clone()
            .ok_or_else(|| Error::not_initialized("orderbook", "unknown"))
    }

    pub fn top_n(
        &self,
        n: usize,
    ) -> Result<(
        Vec<crate::types::PriceLevel>,
        Vec<crate::types::PriceLevel>,
        i64,
    )> {
        Ok(self.snapshot()?.top_n(n))
    }

    /// A WS push that already carries a full normalized book can just
    /// overwrite state, the same as a REST snapshot.
    pub fn handle_orderbook_event(&self, book: OrderBook) -> OrderBookSnapshot {
        self.update_full(book)
    }
}
