//! Cross-venue spread-arbitrage signal generation.

pub mod signal;
pub mod spread_arbitrage;

pub use signal::{ArbitrageDirection, StrategySignal};
pub use spread_arbitrage::{SpreadArbitrageStrategy, StrategyConfig};

use crate::types::OrderBook;

/// Compares top-of-book across both venues and proposes a trade, or stays
/// silent when nothing clears the configured profit threshold.
pub trait Strategy: Send + Sync {
    fn calculate(&self, book_a: &OrderBook, book_b: &OrderBook) -> Option<StrategySignal>;
}
