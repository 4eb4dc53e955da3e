//! Parallel dual-leg order dispatch, with a dry-run path that synthesizes
//! fills instead of touching either venue.

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::strategy::{ArbitrageDirection, StrategySignal};
use crate::types::OrderResult;
use crate::wrapper::Wrapper;

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub result_a: OrderResult,
    pub result_b: OrderResult,
}

pub struct OrderExecutor {
    wrapper_a: Arc<dyn Wrapper>,
    wrapper_b: Arc<dyn Wrapper>,
    symbol_a: String,
    symbol_b: String,
    dry_run: bool,
}

impl OrderExecutor {
    pub fn new(
        wrapper_a: Arc<dyn Wrapper>,
        wrapper_b: Arc<dyn Wrapper>,
        symbol_a: impl Into<String>,
        symbol_b: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            wrapper_a,
            wrapper_b,
            symbol_a: symbol_a.into(),
            symbol_b: symbol_b.into(),
            dry_run,
        }
    }

    pub async fn execute(&self, signal: &StrategySignal) -> Result<ExecutionResult> {
        info!(
            direction = %signal.direction,
            volume = %signal.volume,
            dry_run = self.dry_run,
            "executing signal"
        );
        if self.dry_run {
            return Ok(self.simulate(signal));
        }

        let (leg_a, leg_b) = match signal.direction {
            ArbitrageDirection::SellOnA => (
                self.wrapper_a
                    .sell_market_order(&self.symbol_a, signal.volume),
                self.wrapper_b
                    .buy_market_order(&self.symbol_b, signal.volume),
            ),
            ArbitrageDirection::SellOnB => {
                let quote_amount = signal.volume * signal.price_a;
                (
                    self.wrapper_a
                        .buy_market_order(&self.symbol_a, quote_amount),
                    self.wrapper_b
                        .sell_market_order(&self.symbol_b, signal.volume),
                )
            }
        };
        let (result_a, result_b) = tokio::join!(leg_a, leg_b);
        Ok(ExecutionResult {
            result_a: result_a?,
            result_b: result_b?,
        })
    }

    fn simulate(&self, signal: &StrategySignal) -> ExecutionResult {
        info!(
            direction = %signal.direction,
            volume = %signal.volume,
            price_a = %signal.price_a,
            price_b = %signal.price_b,
            "dry-run order"
        );
        let dummy = |venue: &str, symbol: &str| OrderResult {
            order_id: "dryrun".to_string(),
            venue: venue.to_string(),
            symbol: symbol.to_string(),
            status: "filled".to_string(),
            filled_quantity: signal.volume,
            average_price: None,
            raw: None,
        };
        ExecutionResult {
            result_a: dummy("dryrun-a", &self.symbol_a),
            result_b: dummy("dryrun-b", &self.symbol_b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedBalance, OrderBook, OrderRequest};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubWrapper {
        name: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Wrapper for StubWrapper {
        async fn get_orderbook(&self, _symbol: &str) -> Result<OrderBook> {
            unreachable!()
        }
        async fn get_balance(&self) -> Result<Vec<NamedBalance>> {
            unreachable!()
        }
        async fn place_order(&self, _order: OrderRequest) -> Result<OrderResult> {
            unreachable!()
        }
        async fn cancel_order(&self, _order_id: &str) -> Result<OrderResult> {
            unreachable!()
        }
        async fn get_order_status(&self, _order_id: &str) -> Result<OrderResult> {
            unreachable!()
        }
        async fn buy_market_order(&self, symbol: &str, amount: Decimal) -> Result<OrderResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OrderResult {
                order_id: "1".into(),
                venue: self.name.into(),
                symbol: symbol.into(),
                status: "filled".into(),
                filled_quantity: amount,
                average_price: None,
                raw: None,
            })
        }
        async fn sell_market_order(&self, symbol: &str, volume: Decimal) -> Result<OrderResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OrderResult {
                order_id: "1".into(),
                venue: self.name.into(),
                symbol: symbol.into(),
                status: "filled".into(),
                filled_quantity: volume,
                average_price: None,
                raw: None,
            })
        }
        async fn subscribe_orderbook(
            &self,
            _symbol: &str,
            _callback: crate::wrapper::OrderBookCallback,
        ) -> Result<()> {
            unreachable!()
        }
        async fn close(&self) {}
        fn name(&self) -> &str {
            self.name
        }
    }

    fn signal(direction: ArbitrageDirection) -> StrategySignal {
        StrategySignal {
            direction,
            expected_profit: dec!(0.01),
            volume: dec!(1),
            price_a: dec!(100),
            price_b: dec!(101),
            spread: dec!(0.02),
        }
    }

    #[tokio::test]
    async fn dry_run_returns_synthetic_fills_without_calling_wrappers() {
        let a = Arc::new(StubWrapper {
            name: "ex-a",
            calls: AtomicUsize::new(0),
        });
        let b = Arc::new(StubWrapper {
            name: "ex-b",
            calls: AtomicUsize::new(0),
        });
        let executor = OrderExecutor::new(a.clone(), b.clone(), "SYM-A", "SYM_B", true);
        let result = executor
            .execute(&signal(ArbitrageDirection::SellOnA))
            .await
            .unwrap();
        assert_eq!(result.result_a.status, "filled");
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn live_sell_on_a_dispatches_both_legs_in_parallel() {
        let a = Arc::new(StubWrapper {
            name: "ex-a",
            calls: AtomicUsize::new(0),
        });
        let b = Arc::new(StubWrapper {
            name: "ex-b",
            calls: AtomicUsize::new(0),
        });
        let executor = OrderExecutor::new(a.clone(), b.clone(), "SYM-A", "SYM_B", false);
        let result = executor
            .execute(&signal(ArbitrageDirection::SellOnA))
            .await
            .unwrap();
        assert_eq!(result.result_a.venue, "ex-a");
        assert_eq!(result.result_b.venue, "ex-b");
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn live_sell_on_b_buys_quote_denominated_amount_on_a() {
        let a = Arc::new(StubWrapper {
            name: "ex-a",
            calls: AtomicUsize::new(0),
        });
        let b = Arc::new(StubWrapper {
            name: "ex-b",
            calls: AtomicUsize::new(0),
        });
        let executor = OrderExecutor::new(a, b, "SYM-A", "SYM_B", false);
        let result = executor
            .execute(&signal(ArbitrageDirection::SellOnB))
            .await
            .unwrap();
        // volume(1) * price_a(100) = 100 quote units spent on the A leg.
        assert_eq!(result.result_a.filled_quantity, dec!(100));
    }
}
