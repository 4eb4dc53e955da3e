//! Composes the three risk gates into a single pass/fail verdict.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::balance_checker::{BalanceChecker, BalanceState};
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use super::position_limiter::{PositionLimit, PositionLimiter};
use crate::strategy::StrategySignal;

#[derive(Debug, Clone, Copy)]
pub struct RiskConfig {
    pub reserve_ratio: Decimal,
    pub position_limit: PositionLimit,
    pub circuit_breaker: CircuitBreakerConfig,
}

pub struct RiskManager {
    balance_checker: BalanceChecker,
    position_limiter: PositionLimiter,
    breaker: CircuitBreaker,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            balance_checker: BalanceChecker::new(config.reserve_ratio),
            position_limiter: PositionLimiter::new(config.position_limit),
            breaker: CircuitBreaker::new(config.circuit_breaker),
        }
    }

    pub fn evaluate(&self, signal: &StrategySignal, balances: &BalanceState) -> bool {
        if !self.breaker.allow() {
            info!("circuit breaker is blocking signals");
            return false;
        }
        if !self.position_limiter.validate(signal) {
            info!(volume = %signal.volume, spread = %signal.spread, "position limiter rejected signal");
            return false;
        }
        if !self.balance_checker.validate(signal, balances) {
            info!("balance checker rejected signal");
            return false;
        }
        debug!("risk checks passed");
        true
    }

    pub fn record_success(&self) {
        self.breaker.record_success();
    }

    pub fn record_failure(&self) {
        self.breaker.record_failure();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ArbitrageDirection;
    use rust_decimal_macros::dec;

    fn config() -> RiskConfig {
        RiskConfig {
            reserve_ratio: dec!(0.1),
            position_limit: PositionLimit {
                max_volume: dec!(10),
                max_notional: dec!(100_000),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 2,
                cool_down: std::time::Duration::from_secs(1),
            },
        }
    }

    fn signal() -> StrategySignal {
        StrategySignal {
            direction: ArbitrageDirection::SellOnA,
            expected_profit: dec!(0.01),
            volume: dec!(1),
            price_a: dec!(100),
            price_b: dec!(100),
            spread: dec!(0.02),
        }
    }

    fn balances() -> BalanceState {
        BalanceState {
            base_a: dec!(10),
            quote_a: dec!(10_000),
            base_b: dec!(10),
            quote_b: dec!(10_000),
        }
    }

    #[test]
    fn passes_when_all_gates_clear() {
        let manager = RiskManager::new(config());
        assert!(manager.evaluate(&signal(), &balances()));
    }

    #[test]
    fn breaker_blocks_after_repeated_failures() {
        let manager = RiskManager::new(config());
        manager.record_failure();
        manager.record_failure();
        assert!(!manager.evaluate(&signal(), &balances()));
    }
}
