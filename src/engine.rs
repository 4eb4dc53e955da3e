//! Multi-pair dry-run engine: polls every pair's order books, runs the
//! strategy, gates through risk, and dispatches through the executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::executor::OrderExecutor;
use crate::orderbook::{OrderBookFeed, OrderBookManager};
use crate::risk::{BalanceState, RiskManager};
use crate::strategy::Strategy;
use crate::wrapper::Wrapper;

/// One tradeable pair: its own order-book managers/feeds on both venues,
/// sharing the engine's strategy, risk manager, and executor.
pub struct PairContext {
    pub name: String,
    pub symbol_a: String,
    pub symbol_b: String,
    pub manager_a: Arc<OrderBookManager>,
    pub manager_b: Arc<OrderBookManager>,
    pub feed_a: OrderBookFeed,
    pub feed_b: OrderBookFeed,
    pub executor: OrderExecutor,
}

pub struct Engine {
    wrapper_a: Arc<dyn Wrapper>,
    wrapper_b: Arc<dyn Wrapper>,
    strategy: Arc<dyn Strategy>,
    risk_manager: Arc<RiskManager>,
    pairs: Vec<PairContext>,
    poll_interval: Duration,
    stopping: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(
        wrapper_a: Arc<dyn Wrapper>,
        wrapper_b: Arc<dyn Wrapper>,
        strategy: Arc<dyn Strategy>,
        risk_manager: Arc<RiskManager>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            wrapper_a,
            wrapper_b,
            strategy,
            risk_manager,
            pairs: Vec::new(),
            poll_interval,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn attach_pair(&mut self, pair: PairContext) {
        self.pairs.push(pair);
    }

    pub async fn start(&mut self) -> Result<()> {
        info!(
            pairs = self.pairs.len(),
            feeds = self.pairs.len() * 2,
            "starting feeds"
        );
        for pair in &mut self.pairs {
            pair.feed_a.start().await?;
            pair.feed_b.start().await?;
        }
        self.stopping.store(false, Ordering::SeqCst);
        while !self.stopping.load(Ordering::SeqCst) {
            self.run_once().await;
            tokio::time::sleep(self.poll_interval).await;
        }
        self.stop().await;
        Ok(())
    }

    pub async fn stop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        for pair in &mut self.pairs {
            pair.feed_a.stop().await;
            pair.feed_b.stop().await;
        }
    }

    /// A clone of the stop flag, handed to signal handlers so they can ask
    /// a running `start()` loop to wind down.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stopping.clone()
    }

    pub async fn run_once(&self) {
        if self.pairs.is_empty() {
            tokio::time::sleep(self.poll_interval).await;
            return;
        }
        let balances = match self.fetch_balances().await {
            Ok(b) => b,
            Err(err) => {
                warn!(error = %err, "failed to fetch balances, skipping this tick");
                return;
            }
        };
        for pair in &self.pairs {
            self.run_pair(pair, &balances).await;
        }
    }

    async fn run_pair(&self, pair: &PairContext, balances: &BalanceState) {
        let book_a = match pair.manager_a.snapshot() {
            Ok(snap) => snap.to_orderbook(),
            Err(_) => {
                debug!(pair = %pair.name, "no snapshot yet, skipping this tick");
                return;
            }
        };
        let book_b = match pair.manager_b.snapshot() {
            Ok(snap) => snap.to_orderbook(),
            Err(_) => {
                debug!(pair = %pair.name, "no snapshot yet, skipping this tick");
                return;
            }
        };
        let Some(signal) = self.strategy.calculate(&book_a, &book_b) else {
            debug!(pair = %pair.name, "strategy produced no signal");
            return;
        };
        debug!(pair = %pair.name, direction = %signal.direction, spread = %signal.spread, "strategy signal");
        if !self.risk_manager.evaluate(&signal, balances) {
            info!(
                pair = %pair.name,
                direction = %signal.direction,
                volume = %signal.volume,
                spread = %signal.spread,
                "risk manager rejected signal"
            );
            return;
        }
        match pair.executor.execute(&signal).await {
            Ok(_) => {
                self.risk_manager.record_success();
                info!(
                    pair = %pair.name,
                    direction = %signal.direction,
                    volume = %signal.volume,
                    spread = %signal.spread,
                    "trade completed"
                );
            }
            Err(err) => {
                self.risk_manager.record_failure();
                warn!(pair = %pair.name, error = %err, "execution failed");
            }
        }
    }

    /// All pairs are assumed to share one account per venue, so one balance
    /// fetch covers every pair in this tick.
    async fn fetch_balances(&self) -> Result<BalanceState> {
        let balances_a = self.wrapper_a.get_balance().await?;
        let balances_b = self.wrapper_b.get_balance().await?;
        let state = BalanceState {
            base_a: find_currency(&balances_a, "BTC"),
            quote_a: find_currency(&balances_a, "KRW"),
            base_b: find_currency(&balances_b, "BTC"),
            quote_b: find_currency(&balances_b, "KRW"),
        };
        debug!(
            base_a = %state.base_a, quote_a = %state.quote_a,
            base_b = %state.base_b, quote_b = %state.quote_b,
            "account balances"
        );
        Ok(state)
    }
}

fn find_currency(balances: &[crate::types::NamedBalance], currency: &str) -> Decimal {
    balances
        .iter()
        .find(|b| b.currency.eq_ignore_ascii_case(currency))
        .map(|b| b.balance.available)
        .unwrap_or(Decimal::ZERO)
}
