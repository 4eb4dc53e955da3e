use rust_decimal::Decimal;

/// Which venue holds the short leg of the arbitrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrageDirection {
    SellOnA,
    SellOnB,
}

impl std::fmt::Display for ArbitrageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArbitrageDirection::SellOnA => write!(f, "sell_on_a"),
            ArbitrageDirection::SellOnB => write!(f, "sell_on_b"),
        }
    }
}

/// A proposed dual-leg trade, sized to the thinner side of the two books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySignal {
    pub direction: ArbitrageDirection,
    pub expected_profit: Decimal,
    pub volume: Decimal,
    pub price_a: Decimal,
    pub price_b: Decimal,
    pub spread: Decimal,
}
