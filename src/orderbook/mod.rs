//! Order-book state machine: a sorted snapshot kept current by sequence-
//! guarded deltas, fed by a per-(venue, symbol) subscription loop.

pub mod delta;
pub mod feed;
pub mod manager;
pub mod snapshot;

pub use delta::{Delta, DeltaEntry};
pub use feed::OrderBookFeed;
pub use manager::OrderBookManager;
pub use snapshot::OrderBookSnapshot;
