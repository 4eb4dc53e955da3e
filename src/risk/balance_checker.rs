//! Rejects a signal that would draw either venue's balance below its
//! configured reserve ratio.

use rust_decimal::Decimal;
use tracing::debug;

use crate::strategy::{ArbitrageDirection, StrategySignal};

#[derive(Debug, Clone, Copy)]
pub struct BalanceState {
    pub base_a: Decimal,
    pub quote_a: Decimal,
    pub base_b: Decimal,
    pub quote_b: Decimal,
}

pub struct BalanceChecker {
    reserve_ratio: Decimal,
}

impl BalanceChecker {
    pub fn new(reserve_ratio: Decimal) -> Self {
        Self { reserve_ratio }
    }

    pub fn validate(&self, signal: &StrategySignal, balances: &BalanceState) -> bool {
        match signal.direction {
            ArbitrageDirection::SellOnA => {
                if balances.base_a - signal.volume < balances.base_a * self.reserve_ratio {
                    debug!("balance checker: EX-A base balance insufficient");
                    return false;
                }
                let required_quote_b = signal.volume * signal.price_b;
                if balances.quote_b - required_quote_b < balances.quote_b * self.reserve_ratio {
                    debug!("balance checker: EX-B quote balance insufficient");
                    return false;
                }
            }
            ArbitrageDirection::SellOnB => {
                let required_quote_a = signal.volume * signal.price_a;
                if balances.quote_a - required_quote_a < balances.quote_a * self.reserve_ratio {
                    debug!("balance checker: EX-A quote balance insufficient");
                    return false;
                }
                if balances.base_b - signal.volume < balances.base_b * self.reserve_ratio {
                    debug!("balance checker: EX-B base balance insufficient");
                    return false;
                }
            }
        }
        true
    }
}
