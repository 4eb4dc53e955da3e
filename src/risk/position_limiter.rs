//! Caps a single signal's size and notional exposure.

use rust_decimal::Decimal;
use tracing::debug;

use crate::strategy::StrategySignal;

#[derive(Debug, Clone, Copy)]
pub struct PositionLimit {
    pub max_volume: Decimal,
    pub max_notional: Decimal,
}

pub struct PositionLimiter {
    limit: PositionLimit,
}

impl PositionLimiter {
    pub fn new(limit: PositionLimit) -> Self {
        Self { limit }
    }

    pub fn validate(&self, signal: &StrategySignal) -> bool {
        if signal.volume > self.limit.max_volume {
            debug!(volume = %signal.volume, "position limiter: volume exceeds max");
            return false;
        }
        let notional = signal.price_a.max(signal.price_b) * signal.volume;
        if notional > self.limit.max_notional {
            debug!(notional = %notional, "position limiter: notional exceeds max");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ArbitrageDirection;
    use rust_decimal_macros::dec;

    fn signal(volume: Decimal, price: Decimal) -> StrategySignal {
        StrategySignal {
            direction: ArbitrageDirection::SellOnA,
            expected_profit: dec!(0.01),
            volume,
            price_a: price,
            price_b: price,
            spread: dec!(0.02),
        }
    }

    #[test]
    fn rejects_over_volume() {
        let limiter = PositionLimiter::new(PositionLimit {
            max_volume: dec!(1),
            max_notional: dec!(1_000_000),
        });
        assert!(!limiter.validate(&signal(dec!(2), dec!(100))));
    }

    #[test]
    fn rejects_over_notional() {
        let limiter = PositionLimiter::new(PositionLimit {
            max_volume: dec!(10),
            max_notional: dec!(500),
        });
        assert!(!limiter.validate(&signal(dec!(2), dec!(1000))));
    }

    #[test]
    fn allows_within_limits() {
        let limiter = PositionLimiter::new(PositionLimit {
            max_volume: dec!(10),
            max_notional: dec!(10_000),
        });
        assert!(limiter.validate(&signal(dec!(2), dec!(100))));
    }
}
