//! Incremental order-book updates.

use rust_decimal::Decimal;

use super::snapshot::OrderBookSnapshot;
use crate::errors::{Error, Result};
use crate::types::PriceLevel;

/// One price-level update within a [`Delta`]. `quantity == 0` means "remove
/// this price level"; any other quantity replaces the existing level or
/// inserts a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: i64,
}

/// An incremental order-book update, keyed by the same symbol as the
/// snapshot it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub symbol: String,
    pub bids: Vec<DeltaEntry>,
    pub asks: Vec<DeltaEntry>,
    pub sequence: i64,
}

impl Delta {
    /// Apply this delta to `snapshot` in place.
    ///
    /// A delta whose sequence is strictly behind the snapshot's is a stale
    /// replay and is discarded without mutating anything. A delta for a
    /// different symbol is rejected outright — the source format never
    /// rejects on this, we do.
    pub fn apply(&self, snapshot: &mut OrderBookSnapshot) -> Result<()> {
        if self.symbol != snapshot.symbol {
            return Err(Error::parser(
                snapshot.venue.clone(),
                format!(
                    "delta symbol {} does not match snapshot symbol {}",
                    self.symbol, snapshot.symbol
                ),
            ));
        }
        if self.sequence > 0 && self.sequence < snapshot.sequence {
            return Ok(());
        }
        for entry in &self.bids {
            apply_side(&mut snapshot.bids, *entry, true);
        }
        for entry in &self.asks {
            apply_side(&mut snapshot.asks, *entry, false);
        }
        if self.sequence > 0 {
            snapshot.sequence = self.sequence;
            snapshot.timestamp = self.sequence;
        }
        Ok(())
    }
}

fn apply_side(levels: &mut Vec<PriceLevel>, entry: DeltaEntry, is_bid: bool) {
    if let Some(idx) = levels.iter().position(|lvl| lvl.price == entry.price) {
        if entry.quantity.is_zero() {
            levels.remove(idx);
        } else {
            levels[idx] = PriceLevel {
                price: entry.price,
                quantity: entry.quantity,
                timestamp: entry.timestamp,
            };
        }
    } else if !entry.quantity.is_zero() {
        levels.push(PriceLevel {
            price: entry.price,
            quantity: entry.quantity,
            timestamp: entry.timestamp,
        });
    } else {
        return;
    }
    if is_bid {
        levels.sort_by_key(|b| std::cmp::Reverse(b.price));
    } else {
        levels.sort_by_key(|a| a.price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot_at(seq: i64) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: "BTC".into(),
            venue: "ex-a".into(),
            bids: vec![PriceLevel {
                price: dec!(100),
                quantity: dec!(1),
                timestamp: seq,
            }],
            asks: vec![PriceLevel {
                price: dec!(110),
                quantity: dec!(1),
                timestamp: seq,
            }],
            sequence: seq,
            timestamp: seq,
        }
    }

    #[test]
    fn stale_delta_is_discarded() {
        let mut snap = snapshot_at(10);
        let before = snap.clone();
        let delta = Delta {
            symbol: "BTC".into(),
            bids: vec![DeltaEntry {
                price: dec!(100),
                quantity: dec!(0),
                timestamp: 9,
            }],
            asks: vec![],
            sequence: 9,
        };
        delta.apply(&mut snap).unwrap();
        assert_eq!(snap, before);
    }

    #[test]
    fn zero_qty_removes_level_and_bumps_sequence() {
        let mut snap = snapshot_at(10);
        let delta = Delta {
            symbol: "BTC".into(),
            bids: vec![DeltaEntry {
                price: dec!(100),
                quantity: dec!(0),
                timestamp: 11,
            }],
            asks: vec![],
            sequence: 11,
        };
        delta.apply(&mut snap).unwrap();
        assert!(snap.bids.is_empty());
        assert_eq!(snap.sequence, 11);
    }

    #[test]
    fn nonzero_qty_inserts_and_resorts() {
        let mut snap = snapshot_at(10);
        let delta = Delta {
            symbol: "BTC".into(),
            bids: vec![DeltaEntry {
                price: dec!(105),
                quantity: dec!(2),
                timestamp: 11,
            }],
            asks: vec![],
            sequence: 11,
        };
        delta.apply(&mut snap).unwrap();
        assert_eq!(snap.bids[0].price, dec!(105));
        assert_eq!(snap.bids[1].price, dec!(100));
    }

    #[test]
    fn mismatched_symbol_is_rejected() {
        let mut snap = snapshot_at(10);
        let delta = Delta {
            symbol: "ETH".into(),
            bids: vec![],
            asks: vec![],
            sequence: 11,
        };
        assert!(delta.apply(&mut snap).is_err());
    }

    #[test]
    fn idempotent_replace() {
        let mut snap_once = snapshot_at(10);
        let mut snap_twice = snapshot_at(10);
        let delta = Delta {
            symbol: "BTC".into(),
            bids: vec![DeltaEntry {
                price: dec!(100),
                quantity: dec!(5),
                timestamp: 11,
            }],
            asks: vec![],
            sequence: 11,
        };
        delta.apply(&mut snap_once).unwrap();
        delta.apply(&mut snap_twice).unwrap();
        delta.apply(&mut snap_twice).unwrap();
        assert_eq!(snap_once, snap_twice);
    }
}
