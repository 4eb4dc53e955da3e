//! Compares EX-A and EX-B top-of-book and proposes whichever leg clears the
//! fee + minimum-profit threshold by the widest margin.

use rust_decimal::Decimal;
use tracing::debug;

use super::signal::{ArbitrageDirection, StrategySignal};
use super::Strategy;
use crate::types::OrderBook;

#[derive(Debug, Clone, Copy)]
pub struct StrategyConfig {
    pub min_profit_rate: Decimal,
    pub max_volume: Decimal,
    pub fee_a: Decimal,
    pub fee_b: Decimal,
}

impl StrategyConfig {
    pub fn total_fee(&self) -> Decimal {
        self.fee_a + self.fee_b
    }
}

pub struct SpreadArbitrageStrategy {
    config: StrategyConfig,
}

impl SpreadArbitrageStrategy {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_spread(
        &self,
        sell_price: Decimal,
        buy_price: Decimal,
        direction: ArbitrageDirection,
        available_volume: Decimal,
        price_a: Decimal,
        price_b: Decimal,
    ) -> Option<StrategySignal> {
        if available_volume <= Decimal::ZERO || buy_price <= Decimal::ZERO {
            return None;
        }
        let spread = (sell_price - buy_price) / buy_price;
        let threshold = self.config.total_fee() + self.config.min_profit_rate;
        if spread <= threshold {
            return None;
        }
        let volume = available_volume.min(self.config.max_volume);
        let expected_profit = spread - self.config.total_fee();
        Some(StrategySignal {
            direction,
            expected_profit,
            volume,
            price_a,
            price_b,
            spread,
        })
    }
}

impl Strategy for SpreadArbitrageStrategy {
    fn calculate(&self, book_a: &OrderBook, book_b: &OrderBook) -> Option<StrategySignal> {
        if book_a.bids.is_empty()
            || book_a.asks.is_empty()
            || book_b.bids.is_empty()
            || book_b.asks.is_empty()
        {
            return None;
        }
        let best_bid_a = book_a.bids[0];
        let best_ask_a = book_a.asks[0];
        let best_bid_b = book_b.bids[0];
        let best_ask_b = book_b.asks[0];

        let candidates = [
            self.calc_spread(
                best_bid_a.price,
                best_ask_b.price,
                ArbitrageDirection::SellOnA,
                best_bid_a.quantity.min(best_ask_b.quantity),
                best_bid_a.price,
                best_ask_b.price,
            ),
            self.calc_spread(
                best_bid_b.price,
                best_ask_a.price,
                ArbitrageDirection::SellOnB,
                best_bid_b.quantity.min(best_ask_a.quantity),
                best_ask_a.price,
                best_bid_b.price,
            ),
        ];

        let best = candidates
            .into_iter()
            .flatten()
            .max_by(|a, b| a.expected_profit.cmp(&b.expected_profit));

        if best.is_none() {
            debug!("spread below threshold, no signal");
        }
        best
    }
}
